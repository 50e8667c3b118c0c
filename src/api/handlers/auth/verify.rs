use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{error, instrument};

use super::{
    principal::require_auth,
    state::AuthState,
    types::{UserProfile, VerifyResponse},
};
use crate::api::handlers::{message, ApiError, MessageResponse};

#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(auth, headers))]
pub async fn verify(
    auth: Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, ApiError> {
    let principal = require_auth(&headers, &auth)?;

    let user = auth
        .store()
        .find_by_id(principal.user_id)
        .await
        .map_err(|err| {
            error!("Failed to lookup user: {err:#}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to verify token")
        })?
        .ok_or_else(|| message(StatusCode::NOT_FOUND, "User not found"))?;

    Ok(Json(VerifyResponse {
        user: UserProfile {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}
