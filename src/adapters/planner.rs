//! Keyword rules planner: the default [`ActionPlanner`].
//!
//! A deliberately small stand-in for a language-model producer: it scans
//! lower-cased text for a handful of keywords and emits requests in a fixed
//! order (power, then colour, then brightness). Text it does not understand
//! yields an empty plan.

use std::sync::LazyLock;

use log::info;
use regex::Regex;

use crate::app::commands::ActionRequest;
use crate::app::ports::ActionPlanner;

static ON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(on|restore|resume)\b").expect("static on pattern"));

static PCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})\s*%").expect("static percent pattern"));

#[derive(Debug, Default, Clone, Copy)]
pub struct RulesPlanner;

impl RulesPlanner {
    pub fn new() -> Self {
        Self
    }
}

impl ActionPlanner for RulesPlanner {
    fn plan(&mut self, text: &str) -> Vec<ActionRequest> {
        let lowered = text.to_lowercase();
        let mut actions = Vec::new();

        if lowered.contains("off") {
            actions.push(ActionRequest::Off);
        }
        if ON_RE.is_match(&lowered) {
            actions.push(ActionRequest::OnLast);
        }
        if lowered.contains("warm") || lowered.contains("yellow") {
            actions.push(ActionRequest::SetYellow);
        } else if lowered.contains("cool") || lowered.contains("white") {
            actions.push(ActionRequest::SetWhite);
        }
        if let Some(caps) = PCT_RE.captures(&lowered) {
            // At most three digits, so this always parses.
            let pct: u16 = caps[1].parse().unwrap_or(0);
            actions.push(ActionRequest::SetBrightnessPct(f64::from(pct.min(100))));
        }

        if actions.is_empty() {
            info!("Rules planner found no actions; doing nothing");
        } else {
            info!("Rules planner proposed {} action(s)", actions.len());
        }
        actions
    }
}

/// Whether `text` asks about the sensor rather than the lamp: it names the
/// sensor and is phrased as a question.
pub fn is_sensor_query(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    let mentions = ["sensor", "occupancy", "presence", "status"]
        .iter()
        .any(|k| lowered.contains(k));
    mentions && (lowered.starts_with("can you") || lowered.ends_with('?'))
}
