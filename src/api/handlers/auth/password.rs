//! Forgot/reset password flow.
//!
//! A reset request stores the SHA-256 of a random token with an expiry and
//! mails the raw token inside a frontend link. Resetting looks the hash up,
//! swaps the password and clears the token so it cannot be replayed.

use axum::{extract::Extension, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{
    state::AuthState,
    types::{ForgotPasswordRequest, ResetPasswordRequest},
    utils::{
        build_reset_url, generate_reset_token, hash_password, hash_reset_token, normalize_email,
        now_unix_seconds,
    },
};
use crate::api::{
    email::{EmailMessage, RESET_PASSWORD_TEMPLATE},
    handlers::{message, ApiError, MessageResponse},
};

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 500, description = "Internal error", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn forgot_password(
    auth: Extension<Arc<AuthState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(message(StatusCode::BAD_REQUEST, "Missing payload"));
    };
    let internal = |context: &str, err: &dyn std::fmt::Display| {
        error!("{context}: {err}");
        message(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to start password reset",
        )
    };

    let email = normalize_email(&request.email);
    let user = auth
        .store()
        .find_by_email(&email)
        .await
        .map_err(|err| internal("Failed to lookup user", &err))?;
    let Some(user) = user else {
        return Err(message(StatusCode::NOT_FOUND, "User not found"));
    };

    let token = generate_reset_token().map_err(|err| internal("Failed to generate token", &err))?;
    let expires_at = now_unix_seconds().saturating_add(auth.config().reset_token_ttl_seconds());
    auth.store()
        .set_reset_token(user.id, hash_reset_token(&token), expires_at)
        .await
        .map_err(|err| internal("Failed to store reset token", &err))?;

    let reset_url = build_reset_url(auth.config().frontend_base_url(), &token);
    let email_message = EmailMessage {
        to_email: user.email,
        template: RESET_PASSWORD_TEMPLATE.to_string(),
        payload_json: json!({ "name": user.name, "reset_url": reset_url }).to_string(),
    };
    auth.email_sender()
        .send(&email_message)
        .map_err(|err| internal("Failed to send reset email", &err))?;

    info!(user_id = %user.id, "Password reset requested");

    Ok(Json(MessageResponse::new(
        "Password reset link has been sent to your email",
    )))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = MessageResponse),
        (status = 500, description = "Internal error", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn reset_password(
    auth: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(message(StatusCode::BAD_REQUEST, "Missing payload"));
    };
    if request.new_password.is_empty() {
        return Err(message(StatusCode::BAD_REQUEST, "Password is required"));
    }
    let token = request.token.trim();
    if token.is_empty() {
        return Err(message(StatusCode::BAD_REQUEST, "Invalid or expired token"));
    }

    let password_hash = hash_password(&request.new_password).map_err(|err| {
        error!("Failed to hash password: {err:#}");
        message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to reset password")
    })?;

    let updated = auth
        .store()
        .consume_reset_token(&hash_reset_token(token), now_unix_seconds(), &password_hash)
        .await
        .map_err(|err| {
            error!("Failed to consume reset token: {err:#}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to reset password")
        })?;

    if updated {
        Ok(Json(MessageResponse::new("Password updated successfully")))
    } else {
        Err(message(StatusCode::BAD_REQUEST, "Invalid or expired token"))
    }
}
