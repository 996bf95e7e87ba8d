//! Shared playback controls.
//!
//! [`PlaybackControl`] is the only state shared between the input path
//! (begin/pause/cancel) and the playback task. Requests only set flags; the
//! playback loop observes them on its next poll and applies the transition.
//!
//! A begin made from the input side stays unclaimed until a player picks it
//! up in [`RoutinePlayer::play`](super::RoutinePlayer::play). Cancelling an
//! unclaimed begin drops straight back to `Idle`, since no loop is polling.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Running,
    Paused,
    Cancelled,
    Completed,
}

impl PlaybackState {
    /// Running or paused.
    pub fn is_active(self) -> bool {
        matches!(self, PlaybackState::Running | PlaybackState::Paused)
    }
}

#[derive(Debug)]
struct ControlState {
    state: PlaybackState,
    cancel_requested: bool,
    pause_requested: bool,
    /// A playback task owns the current session.
    claimed: bool,
}

/// Flags read by the playback loop on each poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Requests {
    pub cancel: bool,
    pub pause: bool,
}

/// Cloneable handle to the shared control record.
#[derive(Debug, Clone)]
pub struct PlaybackControl {
    inner: Arc<Mutex<ControlState>>,
}

impl Default for PlaybackControl {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackControl {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ControlState {
                state: PlaybackState::Idle,
                cancel_requested: false,
                pause_requested: false,
                claimed: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        // The record is plain flags; a panic elsewhere cannot leave it torn.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> PlaybackState {
        self.lock().state
    }

    pub fn is_pause_requested(&self) -> bool {
        self.lock().pause_requested
    }

    /// Label for the pause button: "Resume" while a pause is requested.
    pub fn pause_label(&self) -> &'static str {
        if self.is_pause_requested() {
            "Resume"
        } else {
            "Pause"
        }
    }

    /// Idle -> Running, unclaimed until a player picks it up. Clears both
    /// flags. Returns `false` when not idle.
    pub fn request_begin(&self) -> bool {
        let mut guard = self.lock();
        if guard.state != PlaybackState::Idle {
            warn!(state = ?guard.state, "begin ignored, playback already active");
            return false;
        }
        guard.state = PlaybackState::Running;
        guard.cancel_requested = false;
        guard.pause_requested = false;
        debug!("playback begin accepted");
        true
    }

    /// Toggle the pause request. Ignored unless running or paused.
    pub fn request_pause(&self) -> bool {
        let mut guard = self.lock();
        if !guard.state.is_active() {
            debug!(state = ?guard.state, "pause ignored");
            return false;
        }
        guard.pause_requested = !guard.pause_requested;
        debug!(pause_requested = guard.pause_requested, "pause toggled");
        true
    }

    /// Request cancellation. Ignored unless running or paused.
    pub fn request_cancel(&self) -> bool {
        let mut guard = self.lock();
        if !guard.state.is_active() {
            debug!(state = ?guard.state, "cancel ignored");
            return false;
        }
        if !guard.claimed {
            reset_state(&mut guard);
            debug!("cancelled before playback started");
            return true;
        }
        guard.cancel_requested = true;
        debug!("cancel requested");
        true
    }

    /// Take ownership of the session for a playback task.
    ///
    /// Begins from `Idle`, or adopts a begin already made from the input
    /// side. Returns `false` when another task owns the session.
    pub(crate) fn claim(&self) -> bool {
        let mut guard = self.lock();
        if guard.claimed {
            warn!(state = ?guard.state, "begin ignored, playback already active");
            return false;
        }
        if guard.state == PlaybackState::Idle {
            guard.state = PlaybackState::Running;
            guard.cancel_requested = false;
            guard.pause_requested = false;
        }
        guard.claimed = true;
        debug!(state = ?guard.state, "playback claimed");
        true
    }

    pub(crate) fn requests(&self) -> Requests {
        let guard = self.lock();
        Requests {
            cancel: guard.cancel_requested,
            pause: guard.pause_requested,
        }
    }

    pub(crate) fn is_cancel_requested(&self) -> bool {
        self.lock().cancel_requested
    }

    pub(crate) fn set_state(&self, state: PlaybackState) {
        self.lock().state = state;
    }

    /// Back to Idle with both flags cleared.
    pub(crate) fn reset(&self) {
        reset_state(&mut self.lock());
    }
}

fn reset_state(state: &mut ControlState) {
    state.state = PlaybackState::Idle;
    state.cancel_requested = false;
    state.pause_requested = false;
    state.claimed = false;
}
