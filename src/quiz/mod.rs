//! Adaptive quiz core: catalog, difficulty controller and session clock.

pub mod catalog;
pub mod clock;
pub mod controller;
pub mod error;
pub mod pool;
pub mod results;

pub use self::{
    catalog::{Catalog, CatalogError, Difficulty, Question},
    clock::{tick, SessionClock, Tick, TICK_PERIOD},
    controller::{
        AnswerOutcome, AnswerRecord, CompletionReason, Controller, Event, Outcome, SessionState,
        POINTS_PER_CORRECT_ANSWER, QUESTION_TIME_LIMIT_SECONDS,
    },
    error::{InvalidTransition, QuizError},
    pool::RemainingPool,
    results::QuizResults,
};
