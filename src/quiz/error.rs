use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    #[error("quiz has not been started")]
    NotStarted,
    #[error("quiz is already completed")]
    Completed,
    #[error("answer for question {got} while question {expected} is shown")]
    WrongQuestion { expected: usize, got: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("invalid transition: {0}")]
    InvalidTransition(#[from] InvalidTransition),
    #[error("no unused question remains in any tier")]
    PoolExhausted,
    #[error("question catalog is empty")]
    EmptyCatalog,
    #[error("unknown question id: {0}")]
    UnknownQuestion(u32),
}
