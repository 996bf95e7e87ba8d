mod clock;
mod control;
mod cues;
mod player;

pub use clock::{ClockSnapshot, IntervalClock, MonotonicClock, TimeSource};
pub use control::{PlaybackControl, PlaybackState};
pub use cues::{Cue, CueScheduler, CueState, CueThresholds, StyleHint};
pub use player::{remaining_label, PlaybackOutcome, RoutinePlayer, DEFAULT_TICK};
