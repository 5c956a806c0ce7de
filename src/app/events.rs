//! Outbound application events.
//!
//! The occupancy automation emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them.

use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The automation has started (carries initial state).
    Started(StateId),

    /// The automation FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The effective occupancy reading changed (`None` = unknown/stale).
    OccupancyChanged {
        from: Option<bool>,
        to: Option<bool>,
    },
}
