//! One-shot cue policy.
//!
//! Warning and final cues are edge-triggered: each fires the first tick its
//! threshold is crossed and then stays quiet until [`CueScheduler::reset`].
//! The style hint is level-triggered and recomputed every tick.

use serde::{Deserialize, Serialize};

use super::clock::ClockSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Early warning near the end of a long hold.
    Warning,
    /// Last-moment cue, every interval.
    Final,
    /// Interval finished.
    Completion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleHint {
    Normal,
    ShortTime,
}

/// Cue thresholds in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueThresholds {
    #[serde(default = "default_warning_remaining")]
    pub warning_remaining_secs: f64,
    /// Warning only fires for intervals strictly longer than this.
    #[serde(default = "default_warning_min_duration")]
    pub warning_min_duration_secs: f64,
    #[serde(default = "default_final_remaining")]
    pub final_remaining_secs: f64,
    /// At or below this remaining time the display switches to `ShortTime`.
    #[serde(default = "default_short_time")]
    pub short_time_secs: f64,
}

fn default_warning_remaining() -> f64 {
    3.5
}
fn default_warning_min_duration() -> f64 {
    20.0
}
fn default_final_remaining() -> f64 {
    1.5
}
fn default_short_time() -> f64 {
    4.0
}

impl Default for CueThresholds {
    fn default() -> Self {
        Self {
            warning_remaining_secs: default_warning_remaining(),
            warning_min_duration_secs: default_warning_min_duration(),
            final_remaining_secs: default_final_remaining(),
            short_time_secs: default_short_time(),
        }
    }
}

/// Which cues already fired for the current interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CueState {
    pub warning_fired: bool,
    pub final_fired: bool,
    pub completion_fired: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CueScheduler {
    thresholds: CueThresholds,
    state: CueState,
}

impl CueScheduler {
    pub fn new(thresholds: CueThresholds) -> Self {
        Self {
            thresholds,
            state: CueState::default(),
        }
    }

    pub fn thresholds(&self) -> &CueThresholds {
        &self.thresholds
    }

    pub fn state(&self) -> CueState {
        self.state
    }

    /// Clear all fired flags for the next interval.
    pub fn reset(&mut self) {
        self.state = CueState::default();
    }

    /// Cues crossing their threshold on this tick, warning first.
    pub fn evaluate(&mut self, duration: f64, snapshot: &ClockSnapshot) -> Vec<Cue> {
        let t = &self.thresholds;
        let mut fired = Vec::new();

        if !self.state.warning_fired
            && duration > t.warning_min_duration_secs
            && snapshot.remaining < t.warning_remaining_secs
        {
            self.state.warning_fired = true;
            fired.push(Cue::Warning);
        }
        if !self.state.final_fired && snapshot.remaining < t.final_remaining_secs {
            self.state.final_fired = true;
            fired.push(Cue::Final);
        }

        fired
    }

    /// The completion cue, at most once per interval.
    pub fn completion(&mut self) -> Option<Cue> {
        if self.state.completion_fired {
            return None;
        }
        self.state.completion_fired = true;
        Some(Cue::Completion)
    }

    pub fn style_for(&self, remaining: f64) -> StyleHint {
        if remaining > self.thresholds.short_time_secs {
            StyleHint::Normal
        } else {
            StyleHint::ShortTime
        }
    }
}
