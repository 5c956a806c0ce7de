//! DALI command encoder.
//!
//! Maps lamp commands to the ordered 16-bit forward frames the bridge puts
//! on the bus. Everything is broadcast-addressed.
//!
//! ```text
//!  Off            FF 00
//!  RecallMax      FF 05
//!  RecallMin      FF 06
//!  ArcLevel(l)    FE l
//!  ColourTemp     A3 dtr │ C3 dtr1 │ C1 08 │ FF E7 │ C1 08 │ FF E2
//!                 DTR      DTR1      DT8     SET Tc  DT8     ACTIVATE
//! ```
//!
//! The colour-temperature sequence is order-dependent: each frame stages a
//! register consumed by the next, and the device only commits on the final
//! ACTIVATE. Callers must write it without interleaving other frames.

pub mod packet;

use heapless::Vec;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

/// Broadcast indirect command prefix.
const BROADCAST_CMD: u8 = 0xFF;
/// Broadcast direct arc power control.
const BROADCAST_DAPC: u8 = 0xFE;

const CMD_OFF: u8 = 0x00;
const CMD_RECALL_MAX: u8 = 0x05;
const CMD_RECALL_MIN: u8 = 0x06;

/// Special command: DATA TRANSFER REGISTER 0.
const SPECIAL_DTR: u8 = 0xA3;
/// Special command: DATA TRANSFER REGISTER 1.
const SPECIAL_DTR1: u8 = 0xC3;
/// Special command: ENABLE DEVICE TYPE.
const SPECIAL_ENABLE_DT: u8 = 0xC1;
/// Device type 8 (colour control).
const DEVICE_TYPE_8: u8 = 0x08;
/// DT8 extended: SET TEMPORARY COLOUR TEMPERATURE Tc.
const DT8_SET_TEMP_TC: u8 = 0xE7;
/// DT8 extended: ACTIVATE.
const DT8_ACTIVATE: u8 = 0xE2;

/// Highest direct arc power level; 255 is MASK ("no change") on the bus.
pub const MAX_LEVEL: u8 = 254;

/// Longest frame sequence any single action can produce
/// (colour temperature followed by an arc level).
pub const MAX_FRAMES: usize = 7;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One forward frame: opcode (address/command byte) and data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    pub opcode: u8,
    pub data: u8,
}

impl Frame {
    pub const fn new(opcode: u8, data: u8) -> Self {
        Self { opcode, data }
    }
}

/// Ordered frames for one action.
pub type FrameSeq = Vec<Frame, MAX_FRAMES>;

/// A colour-temperature setpoint as the (DTR, DTR1) pair staged before
/// activation. Serialises as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColourTemp(pub u8, pub u8);

impl ColourTemp {
    /// Warm endpoint ("yellow").
    pub const WARM: Self = Self(0x10, 0x27);
    /// Cool endpoint ("white").
    pub const COOL: Self = Self(0x32, 0x00);

    pub const fn dtr(self) -> u8 {
        self.0
    }

    pub const fn dtr1(self) -> u8 {
        self.1
    }
}

/// Device-level command, already resolved against lamp state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaliCommand {
    Off,
    RecallMax,
    RecallMin,
    /// Direct arc power; values above [`MAX_LEVEL`] are clamped.
    ArcLevel(u8),
    ColourTemp(ColourTemp),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode one command into its frame sequence.
pub fn encode(cmd: DaliCommand) -> FrameSeq {
    let mut frames = FrameSeq::new();
    match cmd {
        DaliCommand::Off => push(&mut frames, Frame::new(BROADCAST_CMD, CMD_OFF)),
        DaliCommand::RecallMax => push(&mut frames, Frame::new(BROADCAST_CMD, CMD_RECALL_MAX)),
        DaliCommand::RecallMin => push(&mut frames, Frame::new(BROADCAST_CMD, CMD_RECALL_MIN)),
        DaliCommand::ArcLevel(level) => {
            push(&mut frames, Frame::new(BROADCAST_DAPC, level.min(MAX_LEVEL)));
        }
        DaliCommand::ColourTemp(temp) => {
            for frame in colour_temp_frames(temp) {
                push(&mut frames, frame);
            }
        }
    }
    frames
}

/// Encode several commands back to back, preserving order.
pub fn encode_all(cmds: &[DaliCommand]) -> FrameSeq {
    let mut frames = FrameSeq::new();
    for cmd in cmds {
        for frame in encode(*cmd).iter() {
            push(&mut frames, *frame);
        }
    }
    frames
}

/// The six-frame DT8 colour-temperature sequence.
pub const fn colour_temp_frames(temp: ColourTemp) -> [Frame; 6] {
    [
        Frame::new(SPECIAL_DTR, temp.dtr()),
        Frame::new(SPECIAL_DTR1, temp.dtr1()),
        Frame::new(SPECIAL_ENABLE_DT, DEVICE_TYPE_8),
        Frame::new(BROADCAST_CMD, DT8_SET_TEMP_TC),
        Frame::new(SPECIAL_ENABLE_DT, DEVICE_TYPE_8),
        Frame::new(BROADCAST_CMD, DT8_ACTIVATE),
    ]
}

/// Convert a brightness percentage to an arc level.
///
/// `pct` is clamped to 0-100 (NaN counts as 0) and mapped linearly onto
/// 0-254 with round-half-away-from-zero.
pub fn pct_to_level(pct: f64) -> u8 {
    let pct = if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) };
    (pct / 100.0 * f64::from(MAX_LEVEL)).round() as u8
}

/// Clamp an untrusted integer onto the arc level range.
pub fn clamp_level(level: i64) -> u8 {
    level.clamp(0, i64::from(MAX_LEVEL)) as u8
}

/// Clamp an untrusted integer onto a register byte.
pub fn clamp_byte(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

fn push(frames: &mut FrameSeq, frame: Frame) {
    // MAX_FRAMES covers the longest sequence encode_all is ever given.
    debug_assert!(!frames.is_full(), "frame sequence overflow");
    let _ = frames.push(frame);
}
