//! Fuzz target: JSON action records and the rules planner
//!
//! Whatever the operator types, records either convert into in-range
//! requests or are dropped, and planning never panics.
//!
//! cargo fuzz run fuzz_action_records

#![no_main]

use dalictl::adapters::planner::{RulesPlanner, is_sensor_query};
use dalictl::app::commands::{ActionRequest, parse_records, requests_from_records};
use dalictl::app::ports::ActionPlanner;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(records) = parse_records(text) {
        for req in requests_from_records(&records) {
            if let ActionRequest::SetBrightnessPct(pct) = req {
                assert!((0.0..=100.0).contains(&pct), "pct {pct} escaped the clamp");
            }
        }
    }

    let _ = is_sensor_query(text);
    let plan = RulesPlanner::default().plan(text);
    assert!(plan.len() <= 4, "planner produced {plan:?}");
});
