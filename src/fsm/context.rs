//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the "blackboard" the occupancy states read from and
//! write to: the current reading and time, the lamp's power flag, the
//! vacancy timer, and the action requests produced by the last tick.

use std::time::{Duration, Instant};

use heapless::Vec;

use crate::app::commands::ActionRequest;
use crate::config::AutomationConfig;

/// Most actions a single tick can produce (`OnLast` + brightness).
pub const MAX_TICK_ACTIONS: usize = 4;

/// Action requests produced by one tick, in execution order.
pub type TickActions = Vec<ActionRequest, MAX_TICK_ACTIONS>;

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Inputs (set before each tick) --
    /// Time of this tick.
    pub now: Instant,
    /// Effective occupancy reading; `None` = unknown or stale.
    pub reading: Option<bool>,
    /// Whether the lamp is currently recorded as off.
    pub lamp_off: bool,

    // -- State-owned --
    /// When the room was first seen vacant; `Some` only in `VacantDimmed`.
    pub vacancy_started: Option<Instant>,

    // -- Outputs --
    /// Requests for the executor, drained by the caller after each tick.
    pub actions: TickActions,

    // -- Configuration --
    pub config: AutomationConfig,
}

impl FsmContext {
    pub fn new(config: AutomationConfig, now: Instant) -> Self {
        Self {
            now,
            reading: None,
            lamp_off: false,
            vacancy_started: None,
            actions: TickActions::new(),
            config,
        }
    }

    /// Queue an action request for the executor.
    pub fn emit(&mut self, req: ActionRequest) {
        debug_assert!(!self.actions.is_full(), "tick produced too many actions");
        let _ = self.actions.push(req);
    }

    /// How long the room has been vacant, if the timer is running.
    pub fn vacant_for(&self) -> Option<Duration> {
        self.vacancy_started
            .map(|start| self.now.saturating_duration_since(start))
    }

    pub fn dim_delay(&self) -> Duration {
        Duration::from_secs(self.config.dim_delay_secs)
    }
}
