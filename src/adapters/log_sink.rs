//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing automation events to the `log`
//! facade. Another sink (MQTT, a status socket) would implement the same
//! trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

fn occupancy(v: Option<bool>) -> &'static str {
    match v {
        Some(true) => "PRESENT",
        Some(false) => "CLEAR",
        None => "UNKNOWN",
    }
}

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | automation initial_state={state:?}");
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {from:?} -> {to:?}");
            }
            AppEvent::OccupancyChanged { from, to } => {
                info!("OCCUPANCY | {} -> {}", occupancy(*from), occupancy(*to));
            }
        }
    }
}
