//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters. No bridge or sensor hardware is required.

mod automation_tests;
mod executor_tests;
