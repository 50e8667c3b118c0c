//! Difficulty controller: the adaptive quiz state machine.
//!
//! A session is an owned [`SessionState`] value. Every change goes through
//! [`Controller::transition`], which either applies an [`Event`] completely or
//! returns an error and leaves the state untouched. The session clock feeds
//! timeouts through the same entry point as user answers.
//!
//! Answer flow:
//! 1. the answer must target the question currently shown;
//! 2. a correct answer scores a flat [`POINTS_PER_CORRECT_ANSWER`];
//! 3. difficulty moves one tier up on a correct answer, one tier down otherwise;
//! 4. the next question is drawn from the new tier, or from any tier when that
//!    one is used up;
//! 5. the session completes on its last scheduled slot or when nothing is
//!    left to draw.

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use super::{
    catalog::{Catalog, Difficulty, Question},
    error::{InvalidTransition, QuizError},
    pool::RemainingPool,
};

/// Seconds a question stays on screen before the clock submits an empty answer.
pub const QUESTION_TIME_LIMIT_SECONDS: u32 = 30;

/// Awarded for any correct answer, whatever the question declares.
pub const POINTS_PER_CORRECT_ANSWER: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    Answer {
        answer: String,
        question_index: usize,
    },
    Reset,
}

impl Event {
    /// The event the clock synthesizes when time runs out.
    #[must_use]
    pub fn timeout(question_index: usize) -> Self {
        Self::Answer {
            answer: String::new(),
            question_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CompletionReason {
    /// The last scheduled question was answered.
    LastQuestion,
    /// No unused question was left in any tier.
    PoolExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_index: usize,
    pub answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub points_awarded: u32,
    pub next_difficulty: Difficulty,
    pub completion: Option<CompletionReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Started,
    Answered(AnswerOutcome),
    Reset,
}

/// State of one quiz run. `Default` is the pristine pre-start state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    asked_questions: Vec<Question>,
    current_index: usize,
    current_difficulty: Difficulty,
    score: u32,
    correct_count: usize,
    wrong_count: usize,
    answer_history: Vec<AnswerRecord>,
    time_remaining: u32,
    clock_active: bool,
    completed: bool,
    completion_reason: Option<CompletionReason>,
    planned_length: usize,
    remaining: RemainingPool,
}

impl SessionState {
    #[must_use]
    pub fn is_started(&self) -> bool {
        !self.asked_questions.is_empty()
    }

    /// Question on screen; `None` before start and after completion.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.asked_questions.get(self.current_index)
    }

    #[must_use]
    pub fn asked_questions(&self) -> &[Question] {
        &self.asked_questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_difficulty(&self) -> Difficulty {
        self.current_difficulty
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn wrong_count(&self) -> usize {
        self.wrong_count
    }

    #[must_use]
    pub fn answer_history(&self) -> &[AnswerRecord] {
        &self.answer_history
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn clock_active(&self) -> bool {
        self.clock_active
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn completion_reason(&self) -> Option<CompletionReason> {
        self.completion_reason
    }

    #[must_use]
    pub fn planned_length(&self) -> usize {
        self.planned_length
    }

    #[must_use]
    pub fn remaining(&self) -> &RemainingPool {
        &self.remaining
    }

    /// One clock second; returns what is left.
    pub(super) fn count_down(&mut self) -> u32 {
        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.time_remaining
    }
}

#[derive(Debug, Clone)]
pub struct Controller {
    catalog: Arc<Catalog>,
    question_count: Option<usize>,
}

impl Controller {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            question_count: None,
        }
    }

    /// Nominal session length; defaults to the catalog size. Zero is ignored.
    #[must_use]
    pub fn with_question_count(mut self, count: Option<usize>) -> Self {
        self.question_count = count.filter(|count| *count > 0);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn planned_length(&self) -> usize {
        self.question_count.unwrap_or_else(|| self.catalog.len())
    }

    /// Apply `event` to `state`.
    ///
    /// # Errors
    /// Returns [`QuizError::InvalidTransition`] for answers the state cannot
    /// accept and [`QuizError::EmptyCatalog`] when starting without questions.
    /// On error `state` is unchanged.
    pub fn transition<R: Rng + ?Sized>(
        &self,
        state: &mut SessionState,
        event: Event,
        rng: &mut R,
    ) -> Result<Outcome, QuizError> {
        match event {
            Event::Start => self.start(state, rng),
            Event::Answer {
                answer,
                question_index,
            } => self
                .answer(state, answer, question_index, rng)
                .map(Outcome::Answered),
            Event::Reset => {
                *state = SessionState::default();
                Ok(Outcome::Reset)
            }
        }
    }

    fn start<R: Rng + ?Sized>(
        &self,
        state: &mut SessionState,
        rng: &mut R,
    ) -> Result<Outcome, QuizError> {
        let mut shuffled: Vec<&Question> = self.catalog.questions().collect();
        shuffled.shuffle(rng);
        let first = shuffled.first().ok_or(QuizError::EmptyCatalog)?;

        debug!(
            question_id = first.id,
            difficulty = %first.difficulty,
            "quiz started"
        );

        *state = SessionState {
            asked_questions: vec![(*first).clone()],
            current_difficulty: first.difficulty,
            time_remaining: QUESTION_TIME_LIMIT_SECONDS,
            clock_active: true,
            planned_length: self.planned_length(),
            remaining: RemainingPool::from_catalog(&self.catalog, &[first.id]),
            ..SessionState::default()
        };

        Ok(Outcome::Started)
    }

    fn answer<R: Rng + ?Sized>(
        &self,
        state: &mut SessionState,
        answer: String,
        question_index: usize,
        rng: &mut R,
    ) -> Result<AnswerOutcome, QuizError> {
        if state.completed {
            return Err(InvalidTransition::Completed.into());
        }
        let question = state
            .current_question()
            .ok_or(InvalidTransition::NotStarted)?;
        if question_index != state.current_index {
            return Err(InvalidTransition::WrongQuestion {
                expected: state.current_index,
                got: question_index,
            }
            .into());
        }

        let is_correct = answer == question.correct_answer;
        let points_awarded = if is_correct {
            POINTS_PER_CORRECT_ANSWER
        } else {
            0
        };
        let next_difficulty = state.current_difficulty.after_answer(is_correct);

        let last_slot = question_index + 1 >= state.planned_length;
        let (next_question, completion) = if last_slot {
            (None, Some(CompletionReason::LastQuestion))
        } else {
            match self.select_next(&state.remaining, next_difficulty, rng) {
                Ok(question) => (Some(question), None),
                Err(QuizError::PoolExhausted) => (None, Some(CompletionReason::PoolExhausted)),
                Err(err) => return Err(err),
            }
        };

        state.score += points_awarded;
        if is_correct {
            state.correct_count += 1;
        } else {
            state.wrong_count += 1;
        }
        state.current_difficulty = next_difficulty;
        state.answer_history.push(AnswerRecord {
            question_index,
            answer,
            is_correct,
        });
        state.current_index = question_index + 1;

        if let Some(question) = next_question {
            state.remaining.remove(question.id);
            state.asked_questions.push(question);
            state.time_remaining = QUESTION_TIME_LIMIT_SECONDS;
            state.clock_active = true;
        } else {
            state.time_remaining = 0;
            state.clock_active = false;
            state.completed = true;
            state.completion_reason = completion;
            debug!(score = state.score, reason = ?completion, "quiz completed");
        }

        Ok(AnswerOutcome {
            is_correct,
            points_awarded,
            next_difficulty,
            completion,
        })
    }

    /// Draw the next question from `difficulty`, falling back to any tier.
    fn select_next<R: Rng + ?Sized>(
        &self,
        remaining: &RemainingPool,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<Question, QuizError> {
        let id = remaining
            .pick_from(difficulty, rng)
            .or_else(|| remaining.pick_any(rng))
            .ok_or(QuizError::PoolExhausted)?;
        self.catalog
            .question(id)
            .cloned()
            .ok_or(QuizError::UnknownQuestion(id))
    }
}
