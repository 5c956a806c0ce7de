//! USB-DALI bridge driver and its device backends.
//!
//! | Module     | Provides                                   |
//! |------------|--------------------------------------------|
//! | `bridge`   | [`DaliHidBridge`]: counter, report, pacing |
//! | `hidraw`   | Linux `/dev/hidrawN` device                |
//! | `usb_hid`  | `hidapi` device by vendor/product id       |
//! | `dry_run`  | Logging device, nothing reaches the bus    |

pub mod bridge;
pub mod dry_run;
pub mod hidraw;
#[cfg(feature = "hid")]
pub mod usb_hid;

pub use bridge::DaliHidBridge;

use crate::error::TransportError;

/// A handle that accepts raw HID output reports.
pub trait ReportDevice {
    /// Write one report (report id first). Returns the number of bytes the
    /// device accepted.
    fn write_report(&mut self, report: &[u8]) -> Result<usize, TransportError>;
}

impl<D: ReportDevice + ?Sized> ReportDevice for Box<D> {
    fn write_report(&mut self, report: &[u8]) -> Result<usize, TransportError> {
        (**self).write_report(report)
    }
}
