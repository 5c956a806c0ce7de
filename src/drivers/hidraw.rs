//! Linux hidraw device backend.
//!
//! Writes output reports straight to a `/dev/hidrawN` node. The kernel
//! strips the leading report id for devices without numbered reports.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::TransportError;

use super::ReportDevice;

#[derive(Debug)]
pub struct HidrawDevice {
    file: File,
    path: PathBuf,
}

impl HidrawDevice {
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => TransportError::DeviceNotFound,
                kind => TransportError::Io(kind),
            })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportDevice for HidrawDevice {
    fn write_report(&mut self, report: &[u8]) -> Result<usize, TransportError> {
        Ok(self.file.write(report)?)
    }
}
