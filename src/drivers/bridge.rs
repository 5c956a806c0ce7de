//! DALI-over-HID bridge driver.
//!
//! Wraps each forward frame in a 65-byte output report, stamps it with the
//! rolling frame counter, writes it, then blocks for the pacing delay so the
//! bridge can clock it onto the bus before the next one arrives.
//!
//! The driver is a dumb pipe: it does not retry, reorder or drop frames.

use std::time::Duration;

use log::debug;

use crate::app::ports::{Clock, LampTransport};
use crate::error::TransportError;
use crate::protocol::Frame;
use crate::protocol::packet::{FrameCounter, REPORT_LEN, build_report};

use super::ReportDevice;

pub struct DaliHidBridge<D, C> {
    device: Option<D>,
    counter: FrameCounter,
    pacing: Duration,
    clock: C,
}

impl<D: ReportDevice, C: Clock> DaliHidBridge<D, C> {
    /// A bridge with no device open yet.
    pub fn new(pacing: Duration, clock: C) -> Self {
        Self {
            device: None,
            counter: FrameCounter::new(),
            pacing,
            clock,
        }
    }

    /// A bridge writing to an already opened `device`.
    pub fn with_device(device: D, pacing: Duration, clock: C) -> Self {
        let mut bridge = Self::new(pacing, clock);
        bridge.open(device);
        bridge
    }

    /// Attach a device handle, replacing any previous one.
    pub fn open(&mut self, device: D) {
        self.device = Some(device);
    }

    /// Write a single frame and wait out the pacing delay.
    pub fn send_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        let device = self.device.as_mut().ok_or(TransportError::NotOpen)?;

        let counter = self.counter.next();
        let report = build_report(counter, frame);
        let written = device.write_report(&report)?;
        if written < REPORT_LEN {
            return Err(TransportError::ShortWrite {
                written,
                expected: REPORT_LEN,
            });
        }
        debug!(
            "TX #{counter:3} {:02X} {:02X}",
            frame.opcode, frame.data
        );

        self.clock.sleep(self.pacing);
        Ok(())
    }
}

impl<D: ReportDevice, C: Clock> LampTransport for DaliHidBridge<D, C> {
    fn send(&mut self, frames: &[Frame]) -> Result<(), TransportError> {
        for frame in frames {
            self.send_frame(*frame)?;
        }
        Ok(())
    }
}
