use crate::api::{app, email::LogEmailSender, test_support, AppState};
use crate::quiz::{POINTS_PER_CORRECT_ANSWER, QUESTION_TIME_LIMIT_SECONDS};
use anyhow::{anyhow, Result};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct Harness {
    router: Router,
    state: AppState,
    token: String,
}

impl Harness {
    fn new() -> Result<Self> {
        let state = test_support::app_state(Arc::new(LogEmailSender));
        let token = state.auth.keys().issue(Uuid::new_v4(), "user")?;
        Ok(Self {
            router: app(state.clone())?,
            state,
            token,
        })
    }

    async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", self.token));
        let body = match body {
            Some(body) => {
                builder = builder.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        let response = self.router.clone().oneshot(builder.body(body)?).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    /// Correct answer for the question currently shown in `view`.
    fn correct_answer(&self, view: &Value) -> Result<String> {
        let id = view
            .pointer("/question/id")
            .and_then(Value::as_u64)
            .and_then(|id| u32::try_from(id).ok())
            .ok_or_else(|| anyhow!("no current question in {view}"))?;
        self.state
            .quiz
            .controller()
            .catalog()
            .question(id)
            .map(|question| question.correct_answer.clone())
            .ok_or_else(|| anyhow!("unknown question {id}"))
    }
}

fn index(view: &Value) -> Option<u64> {
    view.get("currentIndex").and_then(Value::as_u64)
}

#[tokio::test]
async fn routes_require_token() -> Result<()> {
    let harness = Harness::new()?;
    for (method, uri) in [
        ("POST", "/api/quiz/start"),
        ("GET", "/api/quiz"),
        ("POST", "/api/quiz/reset"),
        ("GET", "/api/quiz/results"),
    ] {
        let response = harness
            .router
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
    Ok(())
}

#[tokio::test]
async fn start_shows_first_question_without_answer() -> Result<()> {
    let harness = Harness::new()?;
    let (status, view) = harness.call("POST", "/api/quiz/start", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view.get("started"), Some(&json!(true)));
    assert_eq!(index(&view), Some(0));
    assert_eq!(
        view.get("timeRemaining").and_then(Value::as_u64),
        Some(u64::from(QUESTION_TIME_LIMIT_SECONDS))
    );
    assert_eq!(view.get("clockActive"), Some(&json!(true)));
    let question = view.get("question").ok_or_else(|| anyhow!("missing question"))?;
    assert_eq!(question.get("options").and_then(Value::as_array).map(Vec::len), Some(4));
    assert!(question.get("correctAnswer").is_none());
    assert!(question.get("correct_answer").is_none());

    let (status, current) = harness.call("GET", "/api/quiz", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current.get("question"), view.get("question"));
    Ok(())
}

#[tokio::test]
async fn correct_answer_scores_and_advances() -> Result<()> {
    let harness = Harness::new()?;
    let (_, view) = harness.call("POST", "/api/quiz/start", None).await?;
    let answer = harness.correct_answer(&view)?;

    let (status, body) = harness
        .call(
            "POST",
            "/api/quiz/answer",
            Some(json!({ "answer": answer, "questionIndex": 0 })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("isCorrect"), Some(&json!(true)));
    assert_eq!(
        body.get("pointsAwarded").and_then(Value::as_u64),
        Some(u64::from(POINTS_PER_CORRECT_ANSWER))
    );
    let view = body.get("view").ok_or_else(|| anyhow!("missing view"))?;
    assert_eq!(index(view), Some(1));
    assert_eq!(view.get("correctCount").and_then(Value::as_u64), Some(1));
    assert_eq!(
        view.get("score").and_then(Value::as_u64),
        Some(u64::from(POINTS_PER_CORRECT_ANSWER))
    );
    assert_eq!(
        body.get("nextDifficulty"),
        view.get("currentDifficulty")
    );
    Ok(())
}

#[tokio::test]
async fn stale_question_index_conflicts() -> Result<()> {
    let harness = Harness::new()?;
    harness.call("POST", "/api/quiz/start", None).await?;
    let (status, _) = harness
        .call(
            "POST",
            "/api/quiz/answer",
            Some(json!({ "answer": "", "questionIndex": 3 })),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // nothing moved
    let (_, view) = harness.call("GET", "/api/quiz", None).await?;
    assert_eq!(index(&view), Some(0));
    assert_eq!(view.get("wrongCount").and_then(Value::as_u64), Some(0));
    Ok(())
}

#[tokio::test]
async fn answer_before_start_conflicts() -> Result<()> {
    let harness = Harness::new()?;
    let (status, _) = harness
        .call(
            "POST",
            "/api/quiz/answer",
            Some(json!({ "answer": "x", "questionIndex": 0 })),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn full_run_completes_and_reports_results() -> Result<()> {
    let harness = Harness::new()?;
    let (_, mut view) = harness.call("POST", "/api/quiz/start", None).await?;
    let planned = view
        .get("plannedLength")
        .and_then(Value::as_u64)
        .ok_or_else(|| anyhow!("missing plannedLength"))?;

    for question_index in 0..planned {
        let answer = if question_index % 2 == 0 {
            harness.correct_answer(&view)?
        } else {
            "definitely wrong".to_string()
        };
        let (status, body) = harness
            .call(
                "POST",
                "/api/quiz/answer",
                Some(json!({ "answer": answer, "questionIndex": question_index })),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "{body}");
        view = body.get("view").cloned().unwrap_or(Value::Null);
    }

    assert_eq!(view.get("completed"), Some(&json!(true)));
    assert!(view.get("question").is_some_and(Value::is_null));

    let (status, _) = harness
        .call(
            "POST",
            "/api/quiz/answer",
            Some(json!({ "answer": "late", "questionIndex": planned })),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, results) = harness.call("GET", "/api/quiz/results", None).await?;
    assert_eq!(status, StatusCode::OK);
    let correct = planned.div_ceil(2);
    assert_eq!(results.get("answered").and_then(Value::as_u64), Some(planned));
    assert_eq!(results.get("correct").and_then(Value::as_u64), Some(correct));
    assert_eq!(
        results.get("score").and_then(Value::as_u64),
        Some(correct * u64::from(POINTS_PER_CORRECT_ANSWER))
    );
    assert_eq!(
        results.get("review").and_then(Value::as_array).map(Vec::len),
        usize::try_from(planned).ok()
    );
    Ok(())
}

#[tokio::test]
async fn reset_returns_pristine_session() -> Result<()> {
    let harness = Harness::new()?;
    harness.call("POST", "/api/quiz/start", None).await?;
    let (status, view) = harness.call("POST", "/api/quiz/reset", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view.get("started"), Some(&json!(false)));
    assert_eq!(view.get("score").and_then(Value::as_u64), Some(0));

    let (_, current) = harness.call("GET", "/api/quiz", None).await?;
    assert_eq!(current, view);
    Ok(())
}

#[tokio::test]
async fn restart_discards_progress() -> Result<()> {
    let harness = Harness::new()?;
    let (_, view) = harness.call("POST", "/api/quiz/start", None).await?;
    let answer = harness.correct_answer(&view)?;
    harness
        .call(
            "POST",
            "/api/quiz/answer",
            Some(json!({ "answer": answer, "questionIndex": 0 })),
        )
        .await?;

    let (status, view) = harness.call("POST", "/api/quiz/start", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(index(&view), Some(0));
    assert_eq!(view.get("score").and_then(Value::as_u64), Some(0));
    assert!(view.get("history").and_then(Value::as_array).is_some_and(Vec::is_empty));
    Ok(())
}
