//! Session clock: a one-second countdown per question.
//!
//! When the countdown reaches zero the clock submits an empty answer for the
//! question on screen through [`Controller::transition`], exactly as a user
//! would. If a user answer lands first, the timeout's question index is stale
//! and the controller rejects it.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, Notify},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use super::{
    controller::{Controller, Event, Outcome, SessionState},
    error::QuizError,
};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing to count: not started, completed, or the clock was stopped.
    Idle,
    /// Seconds left on the current question.
    Counting(u32),
    /// Time ran out and the timeout answer was applied.
    Expired(Outcome),
}

/// Advance the countdown by one second.
///
/// # Errors
/// Propagates errors from the timeout transition.
pub fn tick<R: Rng + ?Sized>(
    controller: &Controller,
    state: &mut SessionState,
    rng: &mut R,
) -> Result<Tick, QuizError> {
    if !state.clock_active() || state.is_completed() {
        return Ok(Tick::Idle);
    }
    match state.count_down() {
        0 => {
            let index = state.current_index();
            debug!(question_index = index, "question timed out");
            controller
                .transition(state, Event::timeout(index), rng)
                .map(Tick::Expired)
        }
        left => Ok(Tick::Counting(left)),
    }
}

/// Background task driving [`tick`] for one shared session. Aborted on drop.
///
/// Call [`SessionClock::rearm`] after a user answer moves the session to the
/// next question so its 30 s window starts at that moment.
#[derive(Debug)]
pub struct SessionClock {
    handle: JoinHandle<()>,
    rearm: Arc<Notify>,
}

impl SessionClock {
    #[must_use]
    pub fn spawn(
        controller: Arc<Controller>,
        state: Arc<Mutex<SessionState>>,
        period: Duration,
    ) -> Self {
        let rearm = Arc::new(Notify::new());
        let signal = rearm.clone();
        let handle = tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut question = state.lock().await.current_index();

            loop {
                tokio::select! {
                    () = signal.notified() => {
                        question = state.lock().await.current_index();
                        interval.reset();
                        continue;
                    }
                    _ = interval.tick() => {}
                }

                let mut state = state.lock().await;
                if state.current_index() != question {
                    // answered while this tick was waiting on the lock
                    question = state.current_index();
                    continue;
                }
                match tick(&controller, &mut state, &mut rng) {
                    Ok(Tick::Counting(_) | Tick::Expired(_)) if !state.is_completed() => {
                        question = state.current_index();
                    }
                    Ok(_) => break,
                    Err(err) => {
                        warn!("session clock stopped: {err}");
                        break;
                    }
                }
            }
        });
        Self { handle, rearm }
    }

    /// Restart the countdown period from now.
    pub fn rearm(&self) {
        self.rearm.notify_one();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
