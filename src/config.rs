//! System configuration parameters
//!
//! All tunable parameters for the lamp controller. Defaults are overridden
//! by an optional JSON file and then by command-line flags; the result is
//! validated once before anything is constructed from it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound for `max_actions_per_sec`; sizes the rate-limit window.
pub const MAX_ACTIONS_PER_SEC_LIMIT: usize = 16;

/// HID bridge identity and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// USB vendor id of the DALI bridge.
    pub vendor_id: u16,
    /// USB product id of the DALI bridge.
    pub product_id: u16,
    /// Open this hidraw node instead of searching by vendor/product id.
    pub hidraw_path: Option<PathBuf>,
    /// Delay after each frame write (milliseconds).
    pub pacing_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: 0x17B5,
            product_id: 0x0020,
            hidraw_path: None,
            pacing_ms: 30,
        }
    }
}

/// Occupancy sensor link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Serial port of the sensor; `None` disables automation.
    pub port: Option<String>,
    pub baud: u32,
    /// Fixed wait between reconnect attempts (milliseconds).
    pub reconnect_backoff_ms: u64,
    /// A snapshot older than this counts as "no reading" (seconds).
    pub stale_secs: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: 115_200,
            reconnect_backoff_ms: 2000,
            stale_secs: 10,
        }
    }
}

/// Occupancy automation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Brightness applied when presence is detected (0-100%).
    pub occupied_level_pct: f64,
    /// Warning brightness while the room is vacant (0-100%).
    pub dim_level_pct: f64,
    /// Time the room must stay vacant before the lamp goes off (seconds).
    pub dim_delay_secs: u64,
    /// Automation loop period (milliseconds).
    pub tick_interval_ms: u64,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            occupied_level_pct: 60.0,
            dim_level_pct: 10.0,
            dim_delay_secs: 20,
            tick_interval_ms: 200,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub device: DeviceConfig,
    /// Log frames instead of writing them to the bridge.
    pub dry_run: bool,
    /// Where the lamp state snapshot is kept.
    pub state_path: PathBuf,
    pub sensor: SensorConfig,
    /// Ceiling of executed actions per sliding second.
    pub max_actions_per_sec: usize,
    pub automation: AutomationConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            dry_run: false,
            state_path: PathBuf::from("dalictl-state.json"),
            sensor: SensorConfig::default(),
            max_actions_per_sec: 4,
            automation: AutomationConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound,
            kind => ConfigError::Io(kind),
        })?;
        serde_json::from_str(&text).map_err(|_| ConfigError::Malformed)
    }

    /// Range-check every field. Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_ACTIONS_PER_SEC_LIMIT).contains(&self.max_actions_per_sec) {
            return Err(ConfigError::ValidationFailed(
                "max_actions_per_sec must be 1-16",
            ));
        }
        let a = &self.automation;
        if !(0.0..=100.0).contains(&a.occupied_level_pct) {
            return Err(ConfigError::ValidationFailed(
                "automation.occupied_level_pct must be 0-100",
            ));
        }
        if !(0.0..=100.0).contains(&a.dim_level_pct) {
            return Err(ConfigError::ValidationFailed(
                "automation.dim_level_pct must be 0-100",
            ));
        }
        if a.dim_level_pct > a.occupied_level_pct {
            return Err(ConfigError::ValidationFailed(
                "automation.dim_level_pct must not exceed occupied_level_pct",
            ));
        }
        if a.tick_interval_ms == 0 || a.tick_interval_ms > 1000 {
            return Err(ConfigError::ValidationFailed(
                "automation.tick_interval_ms must be 1-1000",
            ));
        }
        if self.sensor.baud == 0 {
            return Err(ConfigError::ValidationFailed("sensor.baud must be > 0"));
        }
        if self.device.pacing_ms > 1000 {
            return Err(ConfigError::ValidationFailed(
                "device.pacing_ms must be 0-1000",
            ));
        }
        Ok(())
    }
}
