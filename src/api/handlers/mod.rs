//! API handlers and shared response helpers.

pub mod auth;
pub mod health;
pub mod quiz;
pub mod quizzes;
pub mod root;

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every error and of plain acknowledgements: `{"msg": "..."}`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

pub type ApiError = (StatusCode, Json<MessageResponse>);

pub fn message(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(MessageResponse::new(msg)))
}
