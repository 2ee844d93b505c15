//! Fixed-interval timer for the per-tick entry point.

use std::time::{Duration, Instant};

/// Fires at most once per `interval`.
///
/// A poll that arrives late fires once and restarts the period from that poll;
/// missed periods are not replayed.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    interval: Duration,
    last_fired: Instant,
}

impl PeriodicTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_fired: now,
        }
    }

    /// Interval equivalent to `frames` frames at `frame_rate` frames per second.
    pub fn interval_for_frames(frames: u32, frame_rate: f64) -> Duration {
        if frame_rate.is_finite() && frame_rate > 0.0 {
            Duration::from_secs_f64(frames as f64 / frame_rate)
        } else {
            Duration::ZERO
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` if an interval has elapsed at `now`, and restarts it.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_fired) >= self.interval {
            self.last_fired = now;
            true
        } else {
            false
        }
    }

    /// Time left until the next poll would fire.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last_fired))
    }
}
