use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    state::AuthState,
    types::{AuthResponse, LoginRequest, UserSummary},
    utils::{normalize_email, verify_password},
};
use crate::api::handlers::{message, ApiError, MessageResponse};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted, token issued", body = AuthResponse),
        (status = 400, description = "Invalid credentials", body = MessageResponse),
        (status = 500, description = "Internal error", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn login(
    auth: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(message(StatusCode::BAD_REQUEST, "Missing payload"));
    };

    let email = normalize_email(&request.email);
    let user = auth.store().find_by_email(&email).await.map_err(|err| {
        error!("Failed to lookup user: {err:#}");
        message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to login")
    })?;

    // Same answer for unknown email and wrong password.
    let Some(user) = user.filter(|user| verify_password(&request.password, &user.password_hash))
    else {
        debug!("Rejected login");
        return Err(message(StatusCode::BAD_REQUEST, INVALID_CREDENTIALS));
    };

    let token = auth.keys().issue(user.id, &user.role).map_err(|err| {
        error!("Failed to issue token: {err}");
        message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to issue token")
    })?;

    Ok(Json(AuthResponse {
        token,
        user: UserSummary {
            id: user.id.to_string(),
            name: user.name,
            role: user.role,
        },
    }))
}
