use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::error::PresentError;
use crate::timer::{Cue, StyleHint};

/// Per-tick display update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// 0.0 ..= 1.0 within the current interval.
    pub fraction: f64,
    /// Whole seconds left, e.g. "7".
    pub remaining_label: String,
    pub style: StyleHint,
}

/// Every outbound notification from the player produces an Event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    PlaybackStarted,
    Announce {
        label: String,
    },
    Progress(Progress),
    WarningCue,
    FinalCue,
    CompletionCue,
    PlaybackReset,
}

impl From<Cue> for PlaybackEvent {
    fn from(cue: Cue) -> Self {
        match cue {
            Cue::Warning => PlaybackEvent::WarningCue,
            Cue::Final => PlaybackEvent::FinalCue,
            Cue::Completion => PlaybackEvent::CompletionCue,
        }
    }
}

/// Port to the presentation layer (display, speech, sound).
///
/// Called inline from the playback task. An error aborts playback and is
/// returned from [`crate::RoutinePlayer::play`].
pub trait Presenter: Send {
    fn playback_started(&mut self) -> Result<(), PresentError>;

    fn announce(&mut self, label: &str) -> Result<(), PresentError>;

    fn progress(&mut self, progress: &Progress) -> Result<(), PresentError>;

    fn cue(&mut self, cue: Cue) -> Result<(), PresentError>;

    fn playback_reset(&mut self) -> Result<(), PresentError>;
}

/// Presenter that records every event. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    events: Arc<Mutex<Vec<PlaybackEvent>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlaybackEvent> {
        self.log().clone()
    }

    /// Recorded events without per-tick progress updates.
    pub fn milestones(&self) -> Vec<PlaybackEvent> {
        self.log()
            .iter()
            .filter(|e| !matches!(e, PlaybackEvent::Progress(_)))
            .cloned()
            .collect()
    }

    pub fn announced_labels(&self) -> Vec<String> {
        self.log()
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::Announce { label } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<PlaybackEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&mut self, event: PlaybackEvent) -> Result<(), PresentError> {
        self.log().push(event);
        Ok(())
    }
}

impl Presenter for RecordingPresenter {
    fn playback_started(&mut self) -> Result<(), PresentError> {
        self.record(PlaybackEvent::PlaybackStarted)
    }

    fn announce(&mut self, label: &str) -> Result<(), PresentError> {
        self.record(PlaybackEvent::Announce {
            label: label.to_string(),
        })
    }

    fn progress(&mut self, progress: &Progress) -> Result<(), PresentError> {
        self.record(PlaybackEvent::Progress(progress.clone()))
    }

    fn cue(&mut self, cue: Cue) -> Result<(), PresentError> {
        self.record(cue.into())
    }

    fn playback_reset(&mut self) -> Result<(), PresentError> {
        self.record(PlaybackEvent::PlaybackReset)
    }
}
