//! Inbound action requests.
//!
//! [`ActionRequest`] is the closed set of lamp intents the executor accepts.
//! Upstream producers (the rules planner, an external NLP service, the
//! automation) hand over loosely-typed [`ActionRecord`]s or build requests
//! directly; records are validated here, once, so the core never sees an
//! unknown action name.

use core::fmt;

use log::warn;
use serde::Deserialize;

use crate::protocol::{clamp_byte, clamp_level};

/// A single lamp intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionRequest {
    /// Broadcast off.
    Off,
    /// Recall the device's MAX level.
    RecallMax,
    /// Recall the device's MIN level.
    RecallMin,
    /// Brightness as a percentage (clamped to 0-100 when executed).
    SetBrightnessPct(f64),
    /// Brightness as a direct arc level (clamped to 0-254 when executed).
    SetBrightnessLevel(u8),
    /// Cool colour-temperature preset.
    SetWhite,
    /// Warm colour-temperature preset.
    SetYellow,
    /// Raw DT8 colour temperature registers.
    SetTempRaw { dtr: u8, dtr1: u8 },
    /// Power on, restoring the last recorded temperature and level.
    OnLast,
}

impl ActionRequest {
    /// Short snake_case name, as used in action records and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::RecallMax => "recall_max",
            Self::RecallMin => "recall_min",
            Self::SetBrightnessPct(_) => "set_brightness_pct",
            Self::SetBrightnessLevel(_) => "set_brightness_level",
            Self::SetWhite => "set_white",
            Self::SetYellow => "set_yellow",
            Self::SetTempRaw { .. } => "set_temp_raw",
            Self::OnLast => "on_last",
        }
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetBrightnessPct(pct) => write!(f, "{}(pct={pct})", self.name()),
            Self::SetBrightnessLevel(level) => write!(f, "{}(level={level})", self.name()),
            Self::SetTempRaw { dtr, dtr1 } => {
                write!(f, "{}(dtr=0x{dtr:02X}, dtr1=0x{dtr1:02X})", self.name())
            }
            _ => f.write_str(self.name()),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Boundary record
// ───────────────────────────────────────────────────────────────

/// Loosely-typed action as produced by an upstream planner:
/// `{"action": "set_brightness_pct", "pct": 40}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRecord {
    pub action: String,
    #[serde(default)]
    pub pct: Option<f64>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub dtr: Option<i64>,
    #[serde(default)]
    pub dtr1: Option<i64>,
}

/// Why a record could not become an [`ActionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The action name is not one the lamp supports.
    UnknownAction(String),
    /// A parameter the action needs is absent.
    MissingParam {
        action: &'static str,
        param: &'static str,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAction(name) => write!(f, "unknown action '{name}'"),
            Self::MissingParam { action, param } => {
                write!(f, "{action} requires '{param}'")
            }
        }
    }
}

impl TryFrom<&ActionRecord> for ActionRequest {
    type Error = RecordError;

    fn try_from(rec: &ActionRecord) -> Result<Self, Self::Error> {
        let req = match rec.action.trim().to_ascii_lowercase().as_str() {
            "off" => Self::Off,
            "recall_max" => Self::RecallMax,
            "recall_min" => Self::RecallMin,
            "set_brightness_pct" => {
                let pct = rec.pct.ok_or(RecordError::MissingParam {
                    action: "set_brightness_pct",
                    param: "pct",
                })?;
                Self::SetBrightnessPct(if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) })
            }
            "set_brightness_level" => {
                let level = rec.level.ok_or(RecordError::MissingParam {
                    action: "set_brightness_level",
                    param: "level",
                })?;
                Self::SetBrightnessLevel(clamp_level(level))
            }
            "set_white" | "set_temp_preset_cool" => Self::SetWhite,
            "set_yellow" | "set_temp_preset_warm" => Self::SetYellow,
            "set_temp_raw" => {
                let dtr = rec.dtr.ok_or(RecordError::MissingParam {
                    action: "set_temp_raw",
                    param: "dtr",
                })?;
                let dtr1 = rec.dtr1.ok_or(RecordError::MissingParam {
                    action: "set_temp_raw",
                    param: "dtr1",
                })?;
                Self::SetTempRaw {
                    dtr: clamp_byte(dtr),
                    dtr1: clamp_byte(dtr1),
                }
            }
            "on_last" | "on" => Self::OnLast,
            _ => return Err(RecordError::UnknownAction(rec.action.clone())),
        };
        Ok(req)
    }
}

/// Convert a batch of records, keeping order. Records that do not map to a
/// supported action are logged and dropped.
pub fn requests_from_records(records: &[ActionRecord]) -> Vec<ActionRequest> {
    records
        .iter()
        .filter_map(|rec| match ActionRequest::try_from(rec) {
            Ok(req) => Some(req),
            Err(e) => {
                warn!("Ignoring action record: {e}");
                None
            }
        })
        .collect()
}

/// Parse JSON text holding one record or an array of records.
pub fn parse_records(text: &str) -> Result<Vec<ActionRecord>, serde_json::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(ActionRecord),
        Many(Vec<ActionRecord>),
    }

    Ok(match serde_json::from_str::<OneOrMany>(text)? {
        OneOrMany::One(rec) => vec![rec],
        OneOrMany::Many(recs) => recs,
    })
}
