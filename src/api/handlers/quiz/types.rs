//! Request/response types for the adaptive quiz endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::quiz::{AnswerRecord, CompletionReason, Difficulty, Question, SessionState};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub answer: String,
    pub question_index: usize,
}

/// A question as shown to the player; the correct answer stays server side.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: u32,
    pub text: String,
    pub options: Vec<String>,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            options: question.options.clone(),
            difficulty: question.difficulty,
            tags: question.tags.clone(),
        }
    }
}

#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub started: bool,
    pub completed: bool,
    pub completion_reason: Option<CompletionReason>,
    pub current_index: usize,
    pub planned_length: usize,
    pub current_difficulty: Difficulty,
    pub score: u32,
    pub correct_count: usize,
    pub wrong_count: usize,
    pub time_remaining: u32,
    pub clock_active: bool,
    pub question: Option<QuestionView>,
    pub history: Vec<AnswerRecord>,
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        Self {
            started: state.is_started(),
            completed: state.is_completed(),
            completion_reason: state.completion_reason(),
            current_index: state.current_index(),
            planned_length: state.planned_length(),
            current_difficulty: state.current_difficulty(),
            score: state.score(),
            correct_count: state.correct_count(),
            wrong_count: state.wrong_count(),
            time_remaining: state.time_remaining(),
            clock_active: state.clock_active(),
            question: state.current_question().map(QuestionView::from),
            history: state.answer_history().to_vec(),
        }
    }
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub is_correct: bool,
    pub points_awarded: u32,
    pub next_difficulty: Difficulty,
    pub completed: bool,
    pub view: SessionView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn pristine_view() -> Result<()> {
        let view = SessionView::from(&SessionState::default());
        assert!(!view.started);
        assert!(view.question.is_none());
        let value = serde_json::to_value(&view)?;
        assert_eq!(
            value.get("currentDifficulty").and_then(serde_json::Value::as_str),
            Some("easy")
        );
        assert!(value.get("timeRemaining").is_some());
        Ok(())
    }

    #[test]
    fn answer_request_uses_camel_case() -> Result<()> {
        let request: AnswerRequest =
            serde_json::from_str(r#"{"answer":"Paris","questionIndex":2}"#)?;
        assert_eq!(request.question_index, 2);
        Ok(())
    }
}
