use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    state::AuthState,
    storage::{InsertOutcome, NewUser, DEFAULT_ROLE},
    types::{AuthResponse, SignupRequest, UserSummary},
    utils::{hash_password, normalize_email, valid_email},
};
use crate::api::handlers::{message, ApiError, MessageResponse};

const ROLES: [&str; 2] = [DEFAULT_ROLE, "admin"];

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User created, token issued", body = AuthResponse),
        (status = 400, description = "Invalid input or user already exists", body = MessageResponse),
        (status = 500, description = "Internal error", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn signup(
    auth: Extension<Arc<AuthState>>,
    payload: Option<Json<SignupRequest>>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(message(StatusCode::BAD_REQUEST, "Missing payload"));
    };

    let name = request.name.trim();
    if name.is_empty() {
        return Err(message(StatusCode::BAD_REQUEST, "Name is required"));
    }
    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(message(StatusCode::BAD_REQUEST, "Invalid email"));
    }
    if request.password.is_empty() {
        return Err(message(StatusCode::BAD_REQUEST, "Password is required"));
    }
    let role = request.role.as_deref().map_or(DEFAULT_ROLE, str::trim);
    if !ROLES.contains(&role) {
        return Err(message(StatusCode::BAD_REQUEST, "Invalid role"));
    }

    let password_hash = hash_password(&request.password).map_err(|err| {
        error!("Failed to hash password: {err:#}");
        message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user")
    })?;

    let outcome = auth
        .store()
        .insert(NewUser {
            name,
            email: &email,
            password_hash: &password_hash,
            role,
        })
        .await
        .map_err(|err| {
            error!("Failed to insert user: {err:#}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user")
        })?;

    let user = match outcome {
        InsertOutcome::Created(user) => user,
        InsertOutcome::Conflict => {
            debug!("Signup for existing email");
            return Err(message(StatusCode::BAD_REQUEST, "User already exists"));
        }
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
