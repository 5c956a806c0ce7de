//! Fuzz target: `parse_line` and `read_lines`
//!
//! Arbitrary serial bytes must never panic the reader, and a link that
//! ends always leaves occupancy unknown.
//!
//! cargo fuzz run fuzz_sensor_line

#![no_main]

use std::io::Cursor;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use dalictl::sensors::serial::read_lines;
use dalictl::sensors::{OccupancyMonitor, parse_line};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let now = Instant::now();
    let _ = parse_line(&String::from_utf8_lossy(data), now);

    let monitor = OccupancyMonitor::new();
    let stop = AtomicBool::new(false);
    // Always ends in EOF, which the reader reports as a disconnect.
    assert!(read_lines(Cursor::new(data), &monitor, &stop).is_err());

    // A dropped link leaves occupancy unknown whatever came before it.
    assert_eq!(monitor.snapshot().presence(), None);
    assert_eq!(monitor.reading(now, Duration::from_secs(10)), None);
});
