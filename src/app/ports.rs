//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LampService (domain)
//! ```
//!
//! Driven adapters (HID bridge, state file, clock, event sinks) implement
//! these traits. The [`LampService`](super::service::LampService) consumes
//! them via generics, so the domain core never touches a device or a file
//! directly.

use std::time::{Duration, Instant};

use crate::error::{StorageError, TransportError};
use crate::protocol::Frame;
use crate::state::LampState;

use super::commands::ActionRequest;
use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → lamp)
// ───────────────────────────────────────────────────────────────

/// Carries encoded frames to the lamp.
pub trait LampTransport {
    /// Write `frames` in order without interleaving anything else.
    ///
    /// Fails on the first frame that could not be written; frames before
    /// it have already reached the bus.
    fn send(&mut self, frames: &[Frame]) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// State port (driven adapter: domain ↔ persisted snapshot)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the [`LampState`] snapshot.
pub trait StatePort {
    /// Load the last snapshot. [`StorageError::NotFound`] on first start.
    fn load(&self) -> Result<LampState, StorageError>;

    /// Persist a snapshot. Implementations MUST NOT leave a partially
    /// written snapshot behind.
    fn save(&mut self, state: &LampState) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time and blocking waits.
pub trait Clock {
    fn now(&self) -> Instant;

    /// Block the calling thread for `d`.
    fn sleep(&self, d: Duration);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The automation emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Planner port (driving adapter: text → domain)
// ───────────────────────────────────────────────────────────────

/// Turns free-form user text into an ordered list of lamp intents.
///
/// An empty list means "nothing to do".
pub trait ActionPlanner {
    fn plan(&mut self, text: &str) -> Vec<ActionRequest>;
}

// Blanket impls so adapters can be shared or boxed.

impl<T: LampTransport + ?Sized> LampTransport for Box<T> {
    fn send(&mut self, frames: &[Frame]) -> Result<(), TransportError> {
        (**self).send(frames)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d);
    }
}
