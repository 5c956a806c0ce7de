//! Canonical lamp state and the action → effect mapping.
//!
//! [`LampState`] is the host's record of what the luminaire was last told.
//! The bus is write-only, so this record is the only knowledge the host has;
//! it drives both the redundancy check and power-on restore.

use heapless::Vec;
use serde::{Deserialize, Deserializer, Serialize};

use crate::app::commands::ActionRequest;
use crate::protocol::{ColourTemp, DaliCommand, MAX_LEVEL, pct_to_level};

/// Level used by `OnLast` when the recorded level is 0.
pub const REILLUMINATE_LEVEL: u8 = 127;

/// Last state written to the lamp.
///
/// `is_off` is an explicit flag and never derived from `last_level`: `Off`
/// keeps the level so that `OnLast` can bring it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LampState {
    #[serde(deserialize_with = "level_from_snapshot")]
    pub last_level: u8,
    pub last_temp: ColourTemp,
    pub is_off: bool,
}

impl Default for LampState {
    fn default() -> Self {
        Self {
            last_level: MAX_LEVEL,
            last_temp: ColourTemp::COOL,
            is_off: false,
        }
    }
}

// 255 is MASK on the bus, never a level; a hand-edited snapshot may hold it.
fn level_from_snapshot<'de, D: Deserializer<'de>>(de: D) -> Result<u8, D::Error> {
    u8::deserialize(de).map(|level| level.min(MAX_LEVEL))
}

/// Device commands for one action, in bus order.
pub type CommandSeq = Vec<DaliCommand, 2>;

/// What executing an action does: the commands to write and the state the
/// lamp is in afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub commands: CommandSeq,
    pub next: LampState,
}

impl LampState {
    /// Whether `req` would leave the lamp exactly as it is.
    ///
    /// Only presets, off and brightness requests are checked. Recalls,
    /// raw temperatures and `OnLast` always execute.
    pub fn is_redundant(&self, req: &ActionRequest) -> bool {
        match *req {
            ActionRequest::SetWhite => self.last_temp == ColourTemp::COOL,
            ActionRequest::SetYellow => self.last_temp == ColourTemp::WARM,
            ActionRequest::Off => self.is_off,
            ActionRequest::SetBrightnessPct(pct) => {
                !self.is_off && pct_to_level(pct) == self.last_level
            }
            ActionRequest::SetBrightnessLevel(level) => {
                !self.is_off && level.min(MAX_LEVEL) == self.last_level
            }
            ActionRequest::RecallMax
            | ActionRequest::RecallMin
            | ActionRequest::SetTempRaw { .. }
            | ActionRequest::OnLast => false,
        }
    }

    /// Resolve `req` against this state.
    pub fn effect_of(&self, req: &ActionRequest) -> Effect {
        let mut next = *self;
        let mut commands = CommandSeq::new();
        let mut emit = |cmd| {
            // CommandSeq holds the longest resolution (OnLast: temp + level).
            let _ = commands.push(cmd);
        };

        match *req {
            ActionRequest::Off => {
                emit(DaliCommand::Off);
                next.is_off = true;
            }
            ActionRequest::RecallMax => {
                emit(DaliCommand::RecallMax);
                next.last_level = MAX_LEVEL;
                next.is_off = false;
            }
            ActionRequest::RecallMin => {
                emit(DaliCommand::RecallMin);
                next.is_off = false;
            }
            ActionRequest::SetBrightnessPct(pct) => {
                let level = pct_to_level(pct);
                emit(DaliCommand::ArcLevel(level));
                next.last_level = level;
                next.is_off = false;
            }
            ActionRequest::SetBrightnessLevel(level) => {
                let level = level.min(MAX_LEVEL);
                emit(DaliCommand::ArcLevel(level));
                next.last_level = level;
                next.is_off = false;
            }
            ActionRequest::SetWhite => {
                emit(DaliCommand::ColourTemp(ColourTemp::COOL));
                next.last_temp = ColourTemp::COOL;
            }
            ActionRequest::SetYellow => {
                emit(DaliCommand::ColourTemp(ColourTemp::WARM));
                next.last_temp = ColourTemp::WARM;
            }
            ActionRequest::SetTempRaw { dtr, dtr1 } => {
                let temp = ColourTemp(dtr, dtr1);
                emit(DaliCommand::ColourTemp(temp));
                next.last_temp = temp;
            }
            ActionRequest::OnLast => {
                let level = match self.last_level {
                    0 => REILLUMINATE_LEVEL,
                    l => l.min(MAX_LEVEL),
                };
                emit(DaliCommand::ColourTemp(self.last_temp));
                emit(DaliCommand::ArcLevel(level));
                next.last_level = level;
                next.is_off = false;
            }
        }

        Effect { commands, next }
    }
}
