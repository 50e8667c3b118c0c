//! # Quizzer (adaptive quiz service)
//!
//! `quizzer` serves a multiple-choice quiz whose difficulty follows the player:
//! every correct answer moves the next question one tier up (easy, medium,
//! hard) and every wrong one moves it one tier down.
//!
//! ## Quiz engine
//!
//! The [`quiz`] module is the core. A [`quiz::Controller`] owns the question
//! catalog and applies one event (`Start`, `Answer`, `Reset`) to an explicit
//! [`quiz::SessionState`]. A [`quiz::SessionClock`] counts down 30 seconds per
//! question and, on expiry, submits an empty answer through the same
//! transition, so a timeout is indistinguishable from a wrong answer.
//!
//! ## HTTP API
//!
//! The [`api`] module exposes the engine over JSON (one session per
//! authenticated user), plus signup/login with HS256 bearer tokens, password
//! reset links and an authenticated proxy to the external QuizAPI catalog.
//! Users live in `PostgreSQL` when a DSN is configured, otherwise in memory.

pub mod api;
pub mod cli;
pub mod quiz;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
