//! Sliding-window action rate limiter.
//!
//! Keeps the timestamps of the last executed actions. An action may run
//! when fewer than `max` of them fall inside the trailing window; otherwise
//! the caller waits until the oldest one ages out. Nothing is ever dropped.

use std::time::{Duration, Instant};

use heapless::Deque;

use crate::config::MAX_ACTIONS_PER_SEC_LIMIT;

/// Window length for the per-second ceiling.
pub const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RateLimiter {
    max: usize,
    window: Duration,
    stamps: Deque<Instant, MAX_ACTIONS_PER_SEC_LIMIT>,
}

impl RateLimiter {
    /// `max` is clamped to 1..=[`MAX_ACTIONS_PER_SEC_LIMIT`].
    pub fn new(max: usize) -> Self {
        Self::with_window(max, WINDOW)
    }

    pub fn with_window(max: usize, window: Duration) -> Self {
        Self {
            max: max.clamp(1, MAX_ACTIONS_PER_SEC_LIMIT),
            window,
            stamps: Deque::new(),
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// How long to wait before another action may run at `now`, or `None`
    /// if it may run immediately. Expired timestamps are pruned.
    pub fn wait_time(&mut self, now: Instant) -> Option<Duration> {
        while let Some(&oldest) = self.stamps.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }

        if self.stamps.len() < self.max {
            return None;
        }
        self.stamps
            .front()
            .map(|&oldest| (oldest + self.window).saturating_duration_since(now))
    }

    /// Record an executed action.
    pub fn record(&mut self, at: Instant) {
        if self.stamps.len() >= self.max {
            self.stamps.pop_front();
        }
        // Capacity is MAX_ACTIONS_PER_SEC_LIMIT >= max, so this cannot fail.
        let _ = self.stamps.push_back(at);
    }
}
