//! Authenticated principal extraction.
//!
//! Read the `Authorization: Bearer <token>` header, verify the token and
//! return a principal that downstream handlers can use.

use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use tracing::debug;
use uuid::Uuid;

use super::state::AuthState;
use crate::api::handlers::{message, ApiError};

/// Authenticated user context derived from the bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

/// Resolve a bearer token into a principal, or return 401.
///
/// # Errors
/// Returns `401` with "No token, authorization denied" when the header is
/// missing and "Token is not valid" when verification fails.
pub fn require_auth(headers: &HeaderMap, auth: &AuthState) -> Result<Principal, ApiError> {
    let Some(token) = bearer_token(headers) else {
        return Err(message(
            StatusCode::UNAUTHORIZED,
            "No token, authorization denied",
        ));
    };

    let claims = auth.keys().verify(token).and_then(|claims| {
        let user_id = claims.user_id()?;
        Ok((user_id, claims.role))
    });

    match claims {
        Ok((user_id, role)) => Ok(Principal { user_id, role }),
        Err(err) => {
            debug!("rejected bearer token: {err}");
            Err(message(StatusCode::UNAUTHORIZED, "Token is not valid"))
        }
    }
}
