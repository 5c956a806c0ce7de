//! Dry-run device: logs each report instead of writing it.

use log::info;

use crate::error::TransportError;

use super::ReportDevice;

#[derive(Debug, Default)]
pub struct DryRunDevice {
    written: u64,
}

impl DryRunDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports "written" so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl ReportDevice for DryRunDevice {
    fn write_report(&mut self, report: &[u8]) -> Result<usize, TransportError> {
        // Counter, opcode and data sit at fixed offsets after the report id.
        let field = |i: usize| report.get(i).copied().unwrap_or(0);
        info!(
            "DRY-RUN | #{:3} {:02X} {:02X}",
            field(2),
            field(7),
            field(8)
        );
        self.written += 1;
        Ok(report.len())
    }
}
