//! Adaptive quiz endpoints, one session per authenticated user.
//!
//! Every call is a thin wrapper over the difficulty controller: the handler
//! resolves the caller, applies one event to the caller's session and returns
//! a [`types::SessionView`]. The session clock keeps running between calls
//! and submits an empty answer when a question times out.

mod state;
pub(crate) mod types;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub use state::QuizState;

use self::types::{AnswerRequest, AnswerResponse, SessionView};
use super::{
    auth::{principal::require_auth, AuthState},
    message, ApiError, MessageResponse,
};
use crate::quiz::{Outcome, QuizError, QuizResults};

fn quiz_error(err: &QuizError) -> ApiError {
    match err {
        QuizError::InvalidTransition(_) => {
            debug!("Rejected quiz event: {err}");
            message(StatusCode::CONFLICT, err.to_string())
        }
        QuizError::EmptyCatalog => {
            error!("Cannot start quiz: {err}");
            message(StatusCode::SERVICE_UNAVAILABLE, "No questions available")
        }
        QuizError::PoolExhausted | QuizError::UnknownQuestion(_) => {
            error!("Quiz transition failed: {err}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Quiz transition failed")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/quiz/start",
    responses(
        (status = 200, description = "Session started with its first question", body = SessionView),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 503, description = "No questions available", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "quiz"
)]
#[instrument(skip(auth, quiz, headers))]
pub async fn start(
    auth: Extension<Arc<AuthState>>,
    quiz: Extension<Arc<QuizState>>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, ApiError> {
    let principal = require_auth(&headers, &auth)?;
    let state = quiz
        .start(principal.user_id)
        .await
        .map_err(|err| quiz_error(&err))?;
    Ok(Json(SessionView::from(&state)))
}

#[utoipa::path(
    get,
    path = "/api/quiz",
    responses(
        (status = 200, description = "Current session, pristine when none", body = SessionView),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "quiz"
)]
#[instrument(skip(auth, quiz, headers))]
pub async fn session(
    auth: Extension<Arc<AuthState>>,
    quiz: Extension<Arc<QuizState>>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, ApiError> {
    let principal = require_auth(&headers, &auth)?;
    let state = quiz.snapshot(principal.user_id).await;
    Ok(Json(SessionView::from(&state)))
}

#[utoipa::path(
    post,
    path = "/api/quiz/answer",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer graded", body = AnswerResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 409, description = "Not started, completed or stale question index", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "quiz"
)]
#[instrument(skip(auth, quiz, headers, payload))]
pub async fn answer(
    auth: Extension<Arc<AuthState>>,
    quiz: Extension<Arc<QuizState>>,
    headers: HeaderMap,
    payload: Option<Json<AnswerRequest>>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let principal = require_auth(&headers, &auth)?;
    let Some(Json(request)) = payload else {
        return Err(message(StatusCode::BAD_REQUEST, "Missing payload"));
    };

    let (outcome, state) = quiz
        .answer(principal.user_id, request.answer, request.question_index)
        .await
        .map_err(|err| quiz_error(&err))?;

    let Outcome::Answered(outcome) = outcome else {
        error!("Answer produced {outcome:?}");
        return Err(message(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Quiz transition failed",
        ));
    };

    Ok(Json(AnswerResponse {
        is_correct: outcome.is_correct,
        points_awarded: outcome.points_awarded,
        next_difficulty: outcome.next_difficulty,
        completed: state.is_completed(),
        view: SessionView::from(&state),
    }))
}

#[utoipa::path(
    post,
    path = "/api/quiz/reset",
    responses(
        (status = 200, description = "Session discarded", body = SessionView),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "quiz"
)]
#[instrument(skip(auth, quiz, headers))]
pub async fn reset(
    auth: Extension<Arc<AuthState>>,
    quiz: Extension<Arc<QuizState>>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, ApiError> {
    let principal = require_auth(&headers, &auth)?;
    let state = quiz
        .reset(principal.user_id)
        .await
        .map_err(|err| quiz_error(&err))?;
    Ok(Json(SessionView::from(&state)))
}

#[utoipa::path(
    get,
    path = "/api/quiz/results",
    responses(
        (status = 200, description = "Score summary and per-question review", body = QuizResults),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
    ),
    security(("bearer" = [])),
    tag = "quiz"
)]
#[instrument(skip(auth, quiz, headers))]
pub async fn results(
    auth: Extension<Arc<AuthState>>,
    quiz: Extension<Arc<QuizState>>,
    headers: HeaderMap,
) -> Result<Json<QuizResults>, ApiError> {
    let principal = require_auth(&headers, &auth)?;
    let state = quiz.snapshot(principal.user_id).await;
    Ok(Json(QuizResults::from_state(&state)))
}

#[cfg(test)]
mod tests;
