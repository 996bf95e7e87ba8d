//! Routine playback.
//!
//! The player walks the routine one interval at a time as a single tokio
//! task. Each tick it samples the time source and then, in this order:
//!
//! ```text
//! cancel requested?      -> stop, skip remaining intervals
//! pause edge?            -> freeze / unfreeze the interval clock
//! otherwise              -> snapshot, cues, progress, finished?
//! ```
//!
//! The sleep between ticks is the only suspension point, so control
//! requests made from another task take effect on the next poll.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::clock::{IntervalClock, MonotonicClock, TimeSource};
use super::control::{PlaybackControl, PlaybackState};
use super::cues::{CueScheduler, CueThresholds};
use crate::error::Result;
use crate::events::{Presenter, Progress};
use crate::routine::{Interval, Routine};

/// Polling interval between ticks.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// How a call to [`RoutinePlayer::play`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlaybackOutcome {
    /// Every interval finished.
    Completed { intervals: usize },
    /// Cancelled after `completed` intervals finished. `at_index` is the
    /// interval that was playing, or about to start, when the cancel landed.
    Cancelled { completed: usize, at_index: usize },
    /// Playback was already active; nothing happened.
    Ignored,
}

enum IntervalEnd {
    Finished,
    Cancelled,
}

pub struct RoutinePlayer<P, T = MonotonicClock> {
    routine: Routine,
    control: PlaybackControl,
    presenter: P,
    time: T,
    tick: Duration,
    clock: IntervalClock,
    cues: CueScheduler,
}

impl<P: Presenter> RoutinePlayer<P, MonotonicClock> {
    /// Player driven by the tokio monotonic clock.
    pub fn with_monotonic_clock(routine: Routine, control: PlaybackControl, presenter: P) -> Self {
        Self::new(routine, control, presenter, MonotonicClock::new())
    }
}

impl<P: Presenter, T: TimeSource> RoutinePlayer<P, T> {
    pub fn new(routine: Routine, control: PlaybackControl, presenter: P, time: T) -> Self {
        Self {
            routine,
            control,
            presenter,
            time,
            tick: DEFAULT_TICK,
            clock: IntervalClock::new(),
            cues: CueScheduler::default(),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_thresholds(mut self, thresholds: CueThresholds) -> Self {
        self.cues = CueScheduler::new(thresholds);
        self
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub fn control(&self) -> PlaybackControl {
        self.control.clone()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Play the routine from the first interval.
    ///
    /// Begins from `Idle`, or picks up a begin already requested on the
    /// control. Returns `Ignored` when another player owns the control.
    /// The control always ends back in `Idle`, including when a presenter
    /// call fails and the error is returned.
    pub async fn play(&mut self) -> Result<PlaybackOutcome> {
        if !self.control.claim() {
            return Ok(PlaybackOutcome::Ignored);
        }
        info!(
            intervals = self.routine.len(),
            total_secs = self.routine.total_duration_secs(),
            "playback started"
        );

        let outcome = match self.run_intervals().await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.control.reset();
                return Err(err);
            }
        };

        let terminal = match outcome {
            PlaybackOutcome::Cancelled {
                completed,
                at_index,
            } => {
                info!(completed, at_index, "playback cancelled");
                PlaybackState::Cancelled
            }
            _ => {
                info!("playback completed");
                PlaybackState::Completed
            }
        };
        self.control.set_state(terminal);

        let reset = self.presenter.playback_reset();
        self.control.reset();
        reset?;

        Ok(outcome)
    }

    async fn run_intervals(&mut self) -> Result<PlaybackOutcome> {
        self.presenter.playback_started()?;

        let mut completed = 0;
        for index in 0..self.routine.len() {
            if self.control.is_cancel_requested() {
                return Ok(PlaybackOutcome::Cancelled {
                    completed,
                    at_index: index,
                });
            }
            let Some(interval) = self.routine.get(index).cloned() else {
                break;
            };

            debug!(index, label = interval.label(), "interval starting");
            match self.play_interval(&interval).await? {
                IntervalEnd::Finished => completed += 1,
                IntervalEnd::Cancelled => {
                    return Ok(PlaybackOutcome::Cancelled {
                        completed,
                        at_index: index,
                    })
                }
            }
        }

        Ok(PlaybackOutcome::Completed {
            intervals: completed,
        })
    }

    async fn play_interval(&mut self, interval: &Interval) -> Result<IntervalEnd> {
        let duration = interval.duration_secs();
        self.cues.reset();
        self.presenter.announce(interval.label())?;
        self.clock.start(self.time.now(), duration);

        loop {
            let now = self.time.now();
            let requests = self.control.requests();

            if requests.cancel {
                return Ok(IntervalEnd::Cancelled);
            }

            match (requests.pause, self.clock.is_paused()) {
                (true, false) => {
                    self.clock.pause(now);
                    self.control.set_state(PlaybackState::Paused);
                    debug!(remaining = self.clock.tick(now).remaining, "paused");
                }
                (true, true) => {}
                (false, true) => {
                    self.clock.resume(now);
                    self.control.set_state(PlaybackState::Running);
                    debug!("resumed");
                }
                (false, false) => {
                    let snapshot = self.clock.tick(now);
                    for cue in self.cues.evaluate(duration, &snapshot) {
                        self.presenter.cue(cue)?;
                    }
                    self.presenter.progress(&Progress {
                        fraction: snapshot.fraction_complete,
                        remaining_label: remaining_label(snapshot.remaining),
                        style: self.cues.style_for(snapshot.remaining),
                    })?;

                    if snapshot.finished {
                        if let Some(cue) = self.cues.completion() {
                            self.presenter.cue(cue)?;
                        }
                        return Ok(IntervalEnd::Finished);
                    }
                }
            }

            tokio::time::sleep(self.tick).await;
        }
    }
}

/// Remaining seconds as shown to the user, never negative.
///
/// Exact halves round away from zero (`2.5` shows `3`), not to even.
pub fn remaining_label(remaining: f64) -> String {
    format!("{}", remaining.max(0.0).round() as i64)
}
