//! Per-interval clock.
//!
//! The clock does not read time itself; every call takes `now` in seconds
//! from a monotonic [`TimeSource`]. Pausing freezes elapsed time and resuming
//! shifts the start reference forward so paused time never counts.

use serde::{Deserialize, Serialize};

/// Monotonic time in seconds from an arbitrary origin.
pub trait TimeSource: Send {
    fn now(&self) -> f64;
}

/// [`TimeSource`] backed by `tokio::time::Instant`.
///
/// Follows tokio's paused clock, so timing tests run instantly.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: tokio::time::Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Progress of one interval at a sampled instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub elapsed: f64,
    /// Negative once the interval has overrun.
    pub remaining: f64,
    /// 0.0 ..= 1.0
    pub fraction_complete: f64,
    pub finished: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IntervalClock {
    duration: f64,
    start_ref: f64,
    end_ref: f64,
    /// Elapsed time captured at pause; `Some` while paused.
    frozen_elapsed: Option<f64>,
}

impl IntervalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin timing an interval of `duration` seconds at `now`.
    pub fn start(&mut self, now: f64, duration: f64) {
        self.duration = duration;
        self.start_ref = now;
        self.end_ref = now + duration;
        self.frozen_elapsed = None;
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_paused(&self) -> bool {
        self.frozen_elapsed.is_some()
    }

    pub fn tick(&self, now: f64) -> ClockSnapshot {
        match self.frozen_elapsed {
            Some(elapsed) => self.snapshot(elapsed, false),
            None => self.snapshot(now - self.start_ref, now >= self.end_ref),
        }
    }

    pub fn pause(&mut self, now: f64) {
        if self.frozen_elapsed.is_none() {
            self.frozen_elapsed = Some(now - self.start_ref);
        }
    }

    pub fn resume(&mut self, now: f64) {
        if let Some(elapsed) = self.frozen_elapsed.take() {
            self.start_ref = now - elapsed;
            self.end_ref = self.start_ref + self.duration;
        }
    }

    fn snapshot(&self, elapsed: f64, finished: bool) -> ClockSnapshot {
        let elapsed = elapsed.max(0.0);
        let fraction_complete = if self.duration > 0.0 {
            (elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        ClockSnapshot {
            elapsed,
            remaining: self.duration - elapsed,
            fraction_complete,
            finished,
        }
    }
}
