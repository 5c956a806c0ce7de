//! dalictl library.
//!
//! Drives a tunable-white DALI lamp through a USB HID bridge. Exposes the
//! encoder, lamp state model, executor and occupancy automation for the
//! binary and for integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod protocol;
pub mod rate_limit;
pub mod sensors;
pub mod state;

pub use error::{Error, Result};
