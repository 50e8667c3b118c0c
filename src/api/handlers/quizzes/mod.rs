//! Authenticated proxy over the external QuizAPI catalog.

pub mod client;

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::IntoParams;

pub use client::{QuizApiClient, QuizApiConfig, QuizApiError};

use super::{
    auth::{principal::require_auth, AuthState},
    message, ApiError, MessageResponse,
};

const DEFAULT_LIMIT: u32 = 10;
const DEFAULT_RANDOM_LIMIT: u32 = 5;

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct QuizFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub limit: Option<u32>,
    pub tags: Option<String>,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct RandomFilter {
    pub limit: Option<u32>,
}

impl QuizFilter {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(difficulty) = &self.difficulty {
            params.push(("difficulty", difficulty.clone()));
        }
        params.push(("limit", self.limit.unwrap_or(DEFAULT_LIMIT).to_string()));
        if let Some(tags) = &self.tags {
            params.push(("tags", tags.clone()));
        }
        params
    }
}

async fn proxy(
    client: &QuizApiClient,
    path: &str,
    params: &[(&str, String)],
    failure: &str,
) -> Result<Json<Value>, ApiError> {
    match client.get(path, params).await {
        Ok(body) => Ok(Json(body)),
        Err(QuizApiError::NotConfigured) => Err(message(
            StatusCode::SERVICE_UNAVAILABLE,
            "Quiz API is not configured",
        )),
        Err(err) => {
            error!("{failure}: {err}");
            Err(message(StatusCode::INTERNAL_SERVER_ERROR, failure))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/quizzes/protected",
    responses(
        (status = 200, description = "Caller is authenticated", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "quizzes"
)]
#[instrument(skip(auth, headers))]
pub async fn protected(
    auth: Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let principal = require_auth(&headers, &auth)?;
    Ok(Json(MessageResponse::new(format!(
        "Hello {}, you are authorized!",
        principal.user_id
    ))))
}

#[utoipa::path(
    get,
    path = "/api/quizzes",
    params(QuizFilter),
    responses(
        (status = 200, description = "Questions from QuizAPI", body = Value),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 500, description = "Upstream failure", body = MessageResponse),
        (status = 503, description = "Quiz API is not configured", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "quizzes"
)]
#[instrument(skip(auth, client, headers))]
pub async fn list_quizzes(
    auth: Extension<Arc<AuthState>>,
    client: Extension<Arc<QuizApiClient>>,
    headers: HeaderMap,
    Query(filter): Query<QuizFilter>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&headers, &auth)?;
    proxy(&client, "questions", &filter.params(), "Failed to fetch quizzes").await
}

#[utoipa::path(
    get,
    path = "/api/quizzes/categories",
    responses(
        (status = 200, description = "Categories from QuizAPI", body = Value),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 500, description = "Upstream failure", body = MessageResponse),
        (status = 503, description = "Quiz API is not configured", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "quizzes"
)]
#[instrument(skip(auth, client, headers))]
pub async fn categories(
    auth: Extension<Arc<AuthState>>,
    client: Extension<Arc<QuizApiClient>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_auth(&headers, &auth)?;
    proxy(&client, "categories", &[], "Failed to fetch quiz categories").await
}

#[utoipa::path(
    get,
    path = "/api/quizzes/tags",
    responses(
        (status = 200, description = "Tags from QuizAPI", body = Value),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 500, description = "Upstream failure", body = MessageResponse),
        (status = 503, description = "Quiz API is not configured", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "quizzes"
)]
#[instrument(skip(auth, client, headers))]
pub async fn tags(
    auth: Extension<Arc<AuthState>>,
    client: Extension<Arc<QuizApiClient>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_auth(&headers, &auth)?;
    proxy(&client, "tags", &[], "Failed to fetch quiz tags").await
}

#[utoipa::path(
    get,
    path = "/api/quizzes/random",
    params(RandomFilter),
    responses(
        (status = 200, description = "Random questions from QuizAPI", body = Value),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 500, description = "Upstream failure", body = MessageResponse),
        (status = 503, description = "Quiz API is not configured", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "quizzes"
)]
#[instrument(skip(auth, client, headers))]
pub async fn random(
    auth: Extension<Arc<AuthState>>,
    client: Extension<Arc<QuizApiClient>>,
    headers: HeaderMap,
    Query(filter): Query<RandomFilter>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&headers, &auth)?;
    let limit = filter.limit.unwrap_or(DEFAULT_RANDOM_LIMIT).to_string();
    proxy(
        &client,
        "questions",
        &[("limit", limit)],
        "Failed to fetch random quizzes",
    )
    .await
}
