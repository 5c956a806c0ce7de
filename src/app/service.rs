//! Action executor: the hexagonal core.
//!
//! [`LampService`] owns the canonical [`LampState`] and the rate limiter.
//! Every action request runs through the same pipeline:
//!
//! ```text
//!  ActionRequest ─▶ redundant? ─yes─▶ Outcome::Redundant
//!                      │ no
//!                      ▼
//!                 rate gate (may block) ─▶ encode ─▶ LampTransport
//!                                                       │ ok
//!                                                       ▼
//!                                       mutate state ─▶ StatePort::save
//!                                                       │
//!                                                       ▼
//!                                        stamp completion in the rate window
//! ```
//!
//! A transport failure aborts before the state is touched, so the record
//! never claims something the lamp did not receive.

use log::{debug, info, warn};

use crate::error::{Result, StorageError};
use crate::protocol::encode_all;
use crate::rate_limit::RateLimiter;
use crate::state::LampState;

use super::commands::ActionRequest;
use super::ports::{Clock, LampTransport, StatePort};

/// What happened to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Frames were written and the state updated.
    Executed { frames: usize },
    /// The lamp already matched the request; nothing was written.
    Redundant,
}

// ───────────────────────────────────────────────────────────────
// LampService
// ───────────────────────────────────────────────────────────────

pub struct LampService<T, S, C> {
    transport: T,
    store: S,
    clock: C,
    state: LampState,
    limiter: RateLimiter,
}

impl<T, S, C> LampService<T, S, C>
where
    T: LampTransport,
    S: StatePort,
    C: Clock,
{
    /// Build the executor, loading the last snapshot from `store`.
    ///
    /// A missing or unreadable snapshot falls back to defaults; start-up
    /// never fails on storage.
    pub fn new(transport: T, store: S, clock: C, max_actions_per_sec: usize) -> Self {
        let state = match store.load() {
            Ok(state) => {
                info!("Loaded lamp state: {state:?}");
                state
            }
            Err(StorageError::NotFound) => {
                info!("No saved lamp state, using defaults");
                LampState::default()
            }
            Err(e) => {
                warn!("Could not load lamp state ({e}), using defaults");
                LampState::default()
            }
        };

        Self {
            transport,
            store,
            clock,
            state,
            limiter: RateLimiter::new(max_actions_per_sec),
        }
    }

    // ── Execution ─────────────────────────────────────────────

    /// Run one request to completion. Blocks while the rate limit is
    /// saturated.
    pub fn execute(&mut self, req: ActionRequest) -> Result<Outcome> {
        if self.state.is_redundant(&req) {
            info!("Skipping {req}: lamp already in that state");
            return Ok(Outcome::Redundant);
        }

        let effect = self.state.effect_of(&req);
        let frames = encode_all(&effect.commands);

        self.wait_for_slot();
        if let Err(e) = self.transport.send(&frames) {
            warn!("Failed to execute {req}: {e}");
            return Err(e.into());
        }

        self.state = effect.next;
        self.persist();
        self.limiter.record(self.clock.now());

        info!(
            "Executed {req} ({} frames) -> level={} temp=({:#04x},{:#04x}) off={}",
            frames.len(),
            self.state.last_level,
            self.state.last_temp.dtr(),
            self.state.last_temp.dtr1(),
            self.state.is_off
        );
        Ok(Outcome::Executed {
            frames: frames.len(),
        })
    }

    /// Apply requests in order. Each one is independent: a failure is
    /// reported in its slot and does not stop the rest.
    pub fn apply_all(&mut self, reqs: &[ActionRequest]) -> Vec<Result<Outcome>> {
        reqs.iter().map(|req| self.execute(*req)).collect()
    }

    // ── Queries ───────────────────────────────────────────────

    /// Copy of the current lamp state.
    pub fn state(&self) -> LampState {
        self.state
    }

    // ── Internal ──────────────────────────────────────────────

    /// Block until the rate limiter admits another action.
    fn wait_for_slot(&mut self) {
        loop {
            match self.limiter.wait_time(self.clock.now()) {
                None => return,
                Some(wait) => {
                    debug!(
                        "Rate limit reached ({}/s), waiting {} ms",
                        self.limiter.max(),
                        wait.as_millis()
                    );
                    self.clock.sleep(wait);
                }
            }
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            warn!("Could not persist lamp state: {e}");
        }
    }
}
