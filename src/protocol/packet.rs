//! HID output report layout for the USB-DALI bridge.
//!
//! Wire format (65 bytes, report id first):
//! ```text
//! ┌────┬──────┬─────────┬──────┬──────┬──────┬──────┬────────┬──────┬─────────┐
//! │ 00 │ 0x12 │ counter │ 0x00 │ 0x03 │ 0x00 │ 0x00 │ opcode │ data │ 0 × 56  │
//! │ id │ mark │  1-255  │ rsvd │ rsvd │ rsvd │ rsvd │        │      │ padding │
//! └────┴──────┴─────────┴──────┴──────┴──────┴──────┴────────┴──────┴─────────┘
//! ```
//!
//! The bridge uses the counter to tell consecutive identical frames apart,
//! so it must change on every frame and never be zero.

use super::Frame;

/// HID report id prefixed to every write.
pub const REPORT_ID: u8 = 0x00;
/// Payload length after the report id.
pub const PAYLOAD_LEN: usize = 64;
/// Full report length handed to the device handle.
pub const REPORT_LEN: usize = PAYLOAD_LEN + 1;

/// Fixed marker byte opening every payload.
const MARKER: u8 = 0x12;
/// Bridge command class: "send 16-bit forward frame".
const FORWARD_16: u8 = 0x03;

/// Rolling frame sequence counter, cycling 1..=255 and skipping 0.
#[derive(Debug, Clone)]
pub struct FrameCounter {
    value: u8,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self { value: 1 }
    }

    /// Advance and return the new value. The first call returns 2.
    pub fn next(&mut self) -> u8 {
        self.value = match self.value.wrapping_add(1) {
            0 => 1,
            v => v,
        };
        self.value
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the full output report for one frame.
pub fn build_report(counter: u8, frame: Frame) -> [u8; REPORT_LEN] {
    let mut report = [0u8; REPORT_LEN];
    report[0] = REPORT_ID;
    let payload = &mut report[1..];
    payload[0] = MARKER;
    payload[1] = counter;
    payload[2] = 0x00;
    payload[3] = FORWARD_16;
    payload[4] = 0x00;
    payload[5] = 0x00;
    payload[6] = frame.opcode;
    payload[7] = frame.data;
    report
}
