//! Occupancy sensor subsystem: line parsing and the shared [`OccupancyMonitor`].
//!
//! The sensor speaks newline-delimited text in one of two dialects:
//!
//! ```text
//!  [radar] mov=12 stat=40 raw=PRESENT      → SensorEvent::Presence
//!  {"raw": true, "occupied": false, ...}   → SensorEvent::Status
//! ```
//!
//! Anything else (boot banners, partial lines) is dropped without touching
//! the monitor. The reader thread lives in [`serial`].
//!
//! Text edges are only sent on change, so they hold until the next edge.
//! JSON status is streamed and expires after the stale window. Losing the
//! link clears both.

pub mod serial;

use core::fmt;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use regex::Regex;
use serde_json::Value;

static PRESENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\braw\s*=\s*(PRESENT|CLEAR)\b").expect("static presence pattern")
});

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One parsed sensor line.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    /// Text dialect: a raw presence edge.
    Presence {
        present: bool,
        at: Instant,
        line: String,
    },
    /// JSON dialect: a status snapshot. Absent keys leave the monitor's
    /// field untouched.
    Status {
        raw: Option<bool>,
        occupied: Option<bool>,
        at: Instant,
        line: String,
    },
}

/// Parse one line received at `at`. Returns `None` for anything that is
/// neither dialect.
pub fn parse_line(line: &str, at: Instant) -> Option<SensorEvent> {
    let text = line.trim();
    if text.is_empty() {
        return None;
    }

    if text.starts_with('{') {
        if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) {
            return Some(SensorEvent::Status {
                raw: obj.get("raw").and_then(Value::as_bool),
                occupied: obj.get("occupied").and_then(Value::as_bool),
                at,
                line: text.to_owned(),
            });
        }
    }

    let caps = PRESENCE_RE.captures(text)?;
    let present = caps[1].eq_ignore_ascii_case("PRESENT");
    Some(SensorEvent::Presence {
        present,
        at,
        line: text.to_owned(),
    })
}

// ---------------------------------------------------------------------------
// Status snapshot
// ---------------------------------------------------------------------------

/// Latest occupancy information from the sensor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccupancyStatus {
    /// Unfiltered presence bit.
    pub raw_present: Option<bool>,
    /// Sensor-side filtered occupancy, when the firmware reports one.
    pub filt_occupied: Option<bool>,
    /// Last accepted line, verbatim.
    pub last_line: String,
    /// When the last accepted line arrived.
    pub updated_at: Option<Instant>,
    /// The last accepted line was a text edge, which does not expire.
    pub latched: bool,
}

impl OccupancyStatus {
    /// Fold an event into the status.
    pub fn apply(&mut self, event: &SensorEvent) {
        match event {
            SensorEvent::Presence { present, at, line } => {
                self.raw_present = Some(*present);
                self.filt_occupied = None;
                self.latched = true;
                self.last_line.clone_from(line);
                self.updated_at = Some(*at);
            }
            SensorEvent::Status {
                raw,
                occupied,
                at,
                line,
            } => {
                if raw.is_some() {
                    self.raw_present = *raw;
                }
                if occupied.is_some() {
                    self.filt_occupied = *occupied;
                }
                self.latched = false;
                self.last_line.clone_from(line);
                self.updated_at = Some(*at);
            }
        }
    }

    /// Effective presence: the filtered bit if known, else the raw one.
    pub fn presence(&self) -> Option<bool> {
        self.filt_occupied.or(self.raw_present)
    }

    /// Effective presence, or `None` if unknown or if a JSON status is
    /// older than `stale`.
    pub fn reading(&self, now: Instant, stale: Duration) -> Option<bool> {
        let updated = self.updated_at?;
        if !self.latched && now.saturating_duration_since(updated) > stale {
            return None;
        }
        self.presence()
    }

    /// Forget the presence bits after the link dropped. The last line and
    /// its time are kept for status queries.
    pub fn clear_presence(&mut self) {
        self.raw_present = None;
        self.filt_occupied = None;
        self.latched = false;
    }
}

fn yes_no(v: Option<bool>) -> &'static str {
    match v {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    }
}

impl fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "raw_present={} occupied={}",
            yes_no(self.raw_present),
            yes_no(self.filt_occupied)
        )?;
        if let Some(at) = self.updated_at {
            write!(f, " updated {:.1}s ago", at.elapsed().as_secs_f32())?;
        }
        if !self.last_line.is_empty() {
            write!(f, " last_line={:?}", self.last_line)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Thread-safe holder of the latest [`OccupancyStatus`].
///
/// The reader thread publishes into it; everyone else takes snapshot copies.
#[derive(Debug, Clone, Default)]
pub struct OccupancyMonitor {
    status: Arc<Mutex<OccupancyStatus>>,
}

impl OccupancyMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, event: &SensorEvent) {
        self.lock().apply(event);
    }

    /// Parse `line` and publish it if it is a sensor event. Returns whether
    /// the line was accepted.
    pub fn ingest(&self, line: &str, at: Instant) -> bool {
        match parse_line(line, at) {
            Some(event) => {
                self.publish(&event);
                true
            }
            None => false,
        }
    }

    /// The sensor link dropped: occupancy is unknown until the next line.
    pub fn disconnected(&self) {
        self.lock().clear_presence();
    }

    /// Copy of the current status.
    pub fn snapshot(&self) -> OccupancyStatus {
        self.lock().clone()
    }

    /// Effective presence as of `now`, treating old data as unknown.
    pub fn reading(&self, now: Instant, stale: Duration) -> Option<bool> {
        self.lock().reading(now, stale)
    }

    // The status is plain data; a writer that panicked cannot leave it
    // half-updated in a way readers care about.
    fn lock(&self) -> MutexGuard<'_, OccupancyStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
