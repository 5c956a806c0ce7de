//! Application core: domain logic behind port traits.
//!
//! This module contains the business rules for the lamp controller: the
//! action executor, the shared coordinator binding callers to it, and the
//! occupancy automation. All interaction with the bridge, the state file
//! and the clock happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod automation;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod shared;
