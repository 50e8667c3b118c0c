//! Per-user quiz sessions shared by the quiz handlers.

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::quiz::{Controller, Event, Outcome, QuizError, SessionClock, SessionState, TICK_PERIOD};

#[derive(Debug)]
struct QuizSession {
    state: Arc<Mutex<SessionState>>,
    clock: SessionClock,
}

/// One session per user id; each started session owns its clock task.
#[derive(Debug)]
pub struct QuizState {
    controller: Arc<Controller>,
    tick_period: Duration,
    sessions: Mutex<HashMap<Uuid, QuizSession>>,
}

impl QuizState {
    #[must_use]
    pub fn new(controller: Controller) -> Self {
        Self {
            controller: Arc::new(controller),
            tick_period: TICK_PERIOD,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Start (or restart) the session of `owner` and arm a fresh clock.
    ///
    /// A restart replaces the previous session, which stops its clock. On error
    /// the previous session is kept as is.
    pub(super) async fn start(&self, owner: Uuid) -> Result<SessionState, QuizError> {
        let mut state = SessionState::default();
        apply(&self.controller, &mut state, Event::Start)?;

        let snapshot = state.clone();
        let state = Arc::new(Mutex::new(state));
        let clock = SessionClock::spawn(self.controller.clone(), state.clone(), self.tick_period);
        self.sessions
            .lock()
            .await
            .insert(owner, QuizSession { state, clock });
        Ok(snapshot)
    }

    /// Apply an answer; a missing session is the pristine one.
    pub(super) async fn answer(
        &self,
        owner: Uuid,
        answer: String,
        question_index: usize,
    ) -> Result<(Outcome, SessionState), QuizError> {
        let sessions = self.sessions.lock().await;
        let Some(session) = sessions.get(&owner) else {
            let mut pristine = SessionState::default();
            let outcome = apply(
                &self.controller,
                &mut pristine,
                Event::Answer {
                    answer,
                    question_index,
                },
            )?;
            return Ok((outcome, pristine));
        };

        let mut state = session.state.lock().await;
        let outcome = apply(
            &self.controller,
            &mut state,
            Event::Answer {
                answer,
                question_index,
            },
        )?;
        if !state.is_completed() {
            session.clock.rearm();
        }
        Ok((outcome, state.clone()))
    }

    /// Drop the session of `owner`, stopping its clock.
    pub(super) async fn reset(&self, owner: Uuid) -> Result<SessionState, QuizError> {
        self.sessions.lock().await.remove(&owner);
        let mut state = SessionState::default();
        apply(&self.controller, &mut state, Event::Reset)?;
        Ok(state)
    }

    pub(super) async fn snapshot(&self, owner: Uuid) -> SessionState {
        let sessions = self.sessions.lock().await;
        match sessions.get(&owner) {
            Some(session) => session.state.lock().await.clone(),
            None => SessionState::default(),
        }
    }
}

fn apply(
    controller: &Controller,
    state: &mut SessionState,
    event: Event,
) -> Result<Outcome, QuizError> {
    controller.transition(state, event, &mut rand::thread_rng())
}
