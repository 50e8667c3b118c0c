//! Results summary for a finished (or abandoned) session.

use serde::Serialize;
use utoipa::ToSchema;

use super::{
    catalog::Difficulty,
    controller::{CompletionReason, SessionState, POINTS_PER_CORRECT_ANSWER},
};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierResult {
    pub difficulty: Difficulty,
    pub answered: usize,
    pub correct: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub question_index: usize,
    pub question_id: u32,
    pub question: String,
    pub difficulty: Difficulty,
    pub your_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub score: u32,
    pub max_score: u32,
    /// Percentage of answered questions that were correct, 0 when none.
    pub accuracy: f64,
    pub answered: usize,
    pub correct: usize,
    pub wrong: usize,
    pub completed: bool,
    pub completion_reason: Option<CompletionReason>,
    pub final_difficulty: Difficulty,
    pub tiers: Vec<TierResult>,
    pub review: Vec<ReviewItem>,
}

impl QuizResults {
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        let review: Vec<ReviewItem> = state
            .answer_history()
            .iter()
            .filter_map(|record| {
                let question = state.asked_questions().get(record.question_index)?;
                Some(ReviewItem {
                    question_index: record.question_index,
                    question_id: question.id,
                    question: question.text.clone(),
                    difficulty: question.difficulty,
                    your_answer: record.answer.clone(),
                    correct_answer: question.correct_answer.clone(),
                    is_correct: record.is_correct,
                    explanation: question.explanation.clone(),
                })
            })
            .collect();

        let tiers = Difficulty::ALL
            .into_iter()
            .map(|difficulty| {
                let items = review.iter().filter(|item| item.difficulty == difficulty);
                TierResult {
                    difficulty,
                    answered: items.clone().count(),
                    correct: items.filter(|item| item.is_correct).count(),
                }
            })
            .collect();

        let answered = state.answer_history().len();
        let max_score = u32::try_from(answered)
            .unwrap_or(u32::MAX)
            .saturating_mul(POINTS_PER_CORRECT_ANSWER);
        #[allow(clippy::cast_precision_loss)]
        let accuracy = if answered == 0 {
            0.0
        } else {
            (state.correct_count() as f64 / answered as f64 * 100.0).round()
        };

        Self {
            score: state.score(),
            max_score,
            accuracy,
            answered,
            correct: state.correct_count(),
            wrong: state.wrong_count(),
            completed: state.is_completed(),
            completion_reason: state.completion_reason(),
            final_difficulty: state.current_difficulty(),
            tiers,
            review,
        }
    }
}
