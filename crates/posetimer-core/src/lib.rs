//! # posetimer Core Library
//!
//! This library provides the core logic for posetimer, a sequential
//! pose/interval timer. A routine of `(label, duration)` entries is parsed
//! from text and played back one interval at a time with a countdown,
//! progress updates and one-shot cues, under pause and cancel controls.
//!
//! ## Architecture
//!
//! - **Routine**: line-oriented `<label>,<seconds>` parser; malformed input
//!   fails the whole parse
//! - **Interval clock**: pure elapsed/remaining arithmetic over caller-supplied
//!   monotonic time, drift-free across pause/resume
//! - **Cue scheduler**: edge-triggered warning/final/completion cues
//! - **Routine player**: async tick loop polling a shared [`PlaybackControl`]
//!   and reporting through the [`Presenter`] port
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`RoutinePlayer`]: playback state machine
//! - [`PlaybackControl`]: begin/pause/cancel handle shared with the input path
//! - [`Presenter`]: capability interface for display, speech and sound
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod routine;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, ParseError, PresentError};
pub use events::{PlaybackEvent, Presenter, Progress, RecordingPresenter};
pub use routine::{parse, Interval, Routine, DEFAULT_ROUTINE};
pub use storage::Config;
pub use timer::{
    ClockSnapshot, Cue, CueScheduler, CueThresholds, IntervalClock, MonotonicClock,
    PlaybackControl, PlaybackOutcome, PlaybackState, RoutinePlayer, StyleHint, TimeSource,
};
