//! System clock adapter.
//!
//! Implements [`Clock`] over `std::time::Instant` and `thread::sleep`.

use std::thread;
use std::time::{Duration, Instant};

use crate::app::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}
