//! Unified error types for the lamp controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! callers' handling uniform. All variants are `Copy` so they can be
//! returned through the executor lock and logged without allocation.

use core::fmt;
use std::io;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The HID bridge could not carry a frame to the lamp.
    Transport(TransportError),
    /// The lamp state snapshot could not be read or written.
    Storage(StorageError),
    /// The occupancy sensor link failed.
    Sensor(SensorError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// A lock guarding shared state was poisoned by a panicking thread.
    Poisoned(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Poisoned(what) => write!(f, "lock poisoned: {what}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// A write was attempted while no device handle is open.
    NotOpen,
    /// No bridge matching the configured identity was found.
    DeviceNotFound,
    /// The device accepted fewer bytes than the report length.
    ShortWrite { written: usize, expected: usize },
    /// The underlying handle reported an I/O error.
    Io(io::ErrorKind),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOpen => write!(f, "device not open"),
            Self::DeviceNotFound => write!(f, "device not found"),
            Self::ShortWrite { written, expected } => {
                write!(f, "short write ({written} of {expected} bytes)")
            }
            Self::Io(kind) => write!(f, "I/O error: {kind}"),
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.kind())
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// No snapshot exists yet (first start).
    NotFound,
    /// The snapshot exists but could not be decoded.
    Corrupted,
    /// Generic I/O error from the backing store.
    Io(io::ErrorKind),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "snapshot not found"),
            Self::Corrupted => write!(f, "snapshot corrupted"),
            Self::Io(kind) => write!(f, "I/O error: {kind}"),
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e.kind())
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The serial port could not be opened.
    OpenFailed(io::ErrorKind),
    /// Access to the serial port was denied.
    AccessDenied,
    /// The link dropped while reading.
    Disconnected(io::ErrorKind),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed(kind) => write!(f, "open failed: {kind}"),
            Self::AccessDenied => write!(f, "access denied"),
            Self::Disconnected(kind) => write!(f, "disconnected: {kind}"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file does not exist.
    NotFound,
    /// The config file exists but is not valid JSON for [`SystemConfig`].
    ///
    /// [`SystemConfig`]: crate::config::SystemConfig
    Malformed,
    /// A field failed range validation; the message names the field.
    ValidationFailed(&'static str),
    /// Generic I/O error reading the file.
    Io(io::ErrorKind),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Malformed => write!(f, "config malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Io(kind) => write!(f, "I/O error: {kind}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
