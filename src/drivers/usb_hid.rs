//! `hidapi` device backend: finds the bridge by vendor/product id.

use hidapi::{HidApi, HidDevice};
use log::info;

use crate::error::TransportError;

use super::ReportDevice;

pub struct UsbHidDevice {
    dev: HidDevice,
}

impl UsbHidDevice {
    pub fn open(vendor_id: u16, product_id: u16) -> Result<Self, TransportError> {
        let api = HidApi::new().map_err(|_| TransportError::Io(std::io::ErrorKind::Other))?;
        let dev = api
            .open(vendor_id, product_id)
            .map_err(|_| TransportError::DeviceNotFound)?;
        info!("Opened HID bridge {vendor_id:04x}:{product_id:04x}");
        Ok(Self { dev })
    }
}

impl ReportDevice for UsbHidDevice {
    fn write_report(&mut self, report: &[u8]) -> Result<usize, TransportError> {
        self.dev
            .write(report)
            .map_err(|_| TransportError::Io(std::io::ErrorKind::Other))
    }
}
