//! Hardware adapter: picks the device backend and builds the bridge.
//!
//! This is the only place that decides which [`ReportDevice`] the lamp is
//! driven through:
//!
//! | Config                 | Backend                   |
//! |------------------------|---------------------------|
//! | `dry_run`              | [`DryRunDevice`]          |
//! | `device.hidraw_path`   | [`HidrawDevice`]          |
//! | otherwise (`hid` feat) | `UsbHidDevice` by vid/pid |

use std::time::Duration;

use log::info;

use crate::config::SystemConfig;
use crate::drivers::dry_run::DryRunDevice;
use crate::drivers::hidraw::HidrawDevice;
use crate::drivers::{DaliHidBridge, ReportDevice};
use crate::error::TransportError;

use super::time::SystemClock;

/// Any device backend, boxed so the binary has one concrete bridge type.
pub type BoxedDevice = Box<dyn ReportDevice + Send>;

/// The bridge as wired in production.
pub type HidBridge = DaliHidBridge<BoxedDevice, SystemClock>;

/// Open the device backend selected by `config`.
pub fn open_device(config: &SystemConfig) -> Result<BoxedDevice, TransportError> {
    if config.dry_run {
        info!("Dry run: frames are logged, not written");
        return Ok(Box::new(DryRunDevice::new()));
    }

    if let Some(path) = &config.device.hidraw_path {
        let dev = HidrawDevice::open(path)?;
        info!("Opened HID bridge at {}", dev.path().display());
        return Ok(Box::new(dev));
    }

    open_by_id(config.device.vendor_id, config.device.product_id)
}

#[cfg(feature = "hid")]
fn open_by_id(vendor_id: u16, product_id: u16) -> Result<BoxedDevice, TransportError> {
    let dev = crate::drivers::usb_hid::UsbHidDevice::open(vendor_id, product_id)?;
    Ok(Box::new(dev))
}

#[cfg(not(feature = "hid"))]
fn open_by_id(vendor_id: u16, product_id: u16) -> Result<BoxedDevice, TransportError> {
    log::warn!(
        "Cannot search for {vendor_id:04x}:{product_id:04x} without the `hid` feature; \
         set device.hidraw_path or use --dry-run"
    );
    Err(TransportError::DeviceNotFound)
}

/// Open the configured device and wrap it in a paced bridge.
pub fn open_bridge(config: &SystemConfig) -> Result<HidBridge, TransportError> {
    let device = open_device(config)?;
    Ok(DaliHidBridge::with_device(
        device,
        Duration::from_millis(config.device.pacing_ms),
        SystemClock,
    ))
}
