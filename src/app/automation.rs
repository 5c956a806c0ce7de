//! Occupancy automation service.
//!
//! [`OccupancyAutomation`] owns the occupancy FSM and its context. Callers
//! feed it readings and time; it hands back the action requests the
//! executor should apply, and reports transitions through an
//! [`EventSink`].
//!
//! ```text
//!  OccupancyMonitor ──snapshot──▶ ┌──────────────────────┐ ──▶ EventSink
//!                                 │ OccupancyAutomation  │
//!         LampState (copy) ──────▶│  FSM · vacancy timer │ ──▶ SharedLamp
//!                                 └──────────────────────┘
//! ```

use std::time::Instant;

use log::{info, warn};

use crate::config::AutomationConfig;
use crate::fsm::context::{FsmContext, TickActions};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::state::LampState;

use super::events::AppEvent;
use super::ports::{Clock, EventSink, LampTransport, StatePort};
use super::shared::SharedLamp;

pub struct OccupancyAutomation {
    fsm: Fsm,
    ctx: FsmContext,
}

impl OccupancyAutomation {
    /// Build the automation. The initial state follows the lamp's power
    /// flag: `Off` if it is recorded off, `Present` otherwise.
    pub fn new(config: AutomationConfig, lamp: &LampState, now: Instant) -> Self {
        let mut ctx = FsmContext::new(config, now);
        ctx.lamp_off = lamp.is_off;
        let fsm = Fsm::new(build_state_table(), StateId::initial(lamp.is_off));
        Self { fsm, ctx }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its initial state. Emits no actions.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start();
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("Automation started in {:?}", self.fsm.current_state());
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Level-triggered step: `reading` is the current effective occupancy
    /// (`None` when unknown or stale).
    pub fn step(
        &mut self,
        reading: Option<bool>,
        now: Instant,
        lamp: &LampState,
        sink: &mut impl EventSink,
    ) -> TickActions {
        if reading != self.ctx.reading {
            sink.emit(&AppEvent::OccupancyChanged {
                from: self.ctx.reading,
                to: reading,
            });
            self.ctx.reading = reading;
        }
        self.run(now, lamp, sink)
    }

    /// A presence edge from the sensor.
    pub fn on_presence(
        &mut self,
        present: bool,
        at: Instant,
        lamp: &LampState,
        sink: &mut impl EventSink,
    ) -> TickActions {
        self.step(Some(present), at, lamp, sink)
    }

    /// Timer tick with no new reading; re-evaluates the last one.
    pub fn on_tick(
        &mut self,
        now: Instant,
        lamp: &LampState,
        sink: &mut impl EventSink,
    ) -> TickActions {
        self.run(now, lamp, sink)
    }

    /// Read the lamp, step, and apply the resulting requests, all under
    /// one hold of the executor lock so the decision sees the power state
    /// it acts on. Failures are logged; the next tick carries on.
    pub fn drive<T, S, C>(
        &mut self,
        reading: Option<bool>,
        now: Instant,
        lamp: &SharedLamp<T, S, C>,
        sink: &mut impl EventSink,
    ) where
        T: LampTransport,
        S: StatePort,
        C: Clock,
    {
        let outcome = lamp.with(|svc| {
            let state = svc.state();
            let actions = self.step(reading, now, &state, sink);
            let results = svc.apply_all(&actions);
            (actions, results)
        });

        match outcome {
            Ok((actions, results)) => {
                for (req, result) in actions.iter().zip(results) {
                    if let Err(e) = result {
                        warn!("Automation action {req} failed: {e}");
                    }
                }
            }
            Err(e) => warn!("Automation cannot reach the lamp: {e}"),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Last effective reading the automation acted on.
    pub fn reading(&self) -> Option<bool> {
        self.ctx.reading
    }

    // ── Internal ──────────────────────────────────────────────

    fn run(&mut self, now: Instant, lamp: &LampState, sink: &mut impl EventSink) -> TickActions {
        self.ctx.now = now;
        self.ctx.lamp_off = lamp.is_off;

        let prev = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);
        let next = self.fsm.current_state();
        if next != prev {
            sink.emit(&AppEvent::StateChanged {
                from: prev,
                to: next,
            });
        }

        core::mem::take(&mut self.ctx.actions)
    }
}
