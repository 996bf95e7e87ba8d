//! Terminal presenters.
//!
//! `TerminalPresenter` draws an in-place progress bar, rings the bell on cues
//! and optionally hands labels to an external speech program.
//! `JsonPresenter` prints one timestamped JSON object per event.

use std::io::Write;
use std::process::{Child, Command, Stdio};

use chrono::Utc;
use posetimer_core::{Cue, PlaybackEvent, PresentError, Presenter, Progress, StyleHint};
use serde::Serialize;
use tracing::debug;

const BAR_WIDTH: usize = 30;
const BELL: &str = "\x07";

pub struct TerminalPresenter<W> {
    out: W,
    bell: bool,
    speak_command: Option<String>,
    speech: Option<Child>,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W, bell: bool, speak_command: &str) -> Self {
        let speak_command = Some(speak_command.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Self {
            out,
            bell,
            speak_command,
            speech: None,
        }
    }

    fn speak(&mut self, label: &str) -> Result<(), PresentError> {
        let Some(program) = &self.speak_command else {
            return Ok(());
        };

        // Reap the previous utterance if it has finished; never block on it.
        if let Some(mut previous) = self.speech.take() {
            if previous.try_wait()?.is_none() {
                debug!(label, "previous speech still running, label not spoken");
                self.speech = Some(previous);
                return Ok(());
            }
        }

        let child = Command::new(program)
            .arg(label)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PresentError {
                message: format!("cannot run speech command '{program}': {e}"),
                source: Some(Box::new(e)),
            })?;
        self.speech = Some(child);
        Ok(())
    }

    fn ring(&mut self) -> Result<(), PresentError> {
        if self.bell {
            write!(self.out, "{BELL}")?;
            self.out.flush()?;
        }
        Ok(())
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn playback_started(&mut self) -> Result<(), PresentError> {
        writeln!(
            self.out,
            "Starting. Type `p` + Enter to pause/resume, `c` + Enter to cancel."
        )?;
        Ok(())
    }

    fn announce(&mut self, label: &str) -> Result<(), PresentError> {
        writeln!(self.out, "\n== {label}")?;
        self.speak(label)
    }

    fn progress(&mut self, progress: &Progress) -> Result<(), PresentError> {
        write!(self.out, "\r{}", render_bar(progress))?;
        self.out.flush()?;
        Ok(())
    }

    fn cue(&mut self, cue: Cue) -> Result<(), PresentError> {
        if cue == Cue::Completion {
            writeln!(self.out)?;
        }
        self.ring()
    }

    fn playback_reset(&mut self) -> Result<(), PresentError> {
        writeln!(self.out, "\nDone.")?;
        Ok(())
    }
}

/// `[#########---------]  12s`, with a `!` marker in the short-time style.
fn render_bar(progress: &Progress) -> String {
    let filled = (progress.fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    let marker = match progress.style {
        StyleHint::Normal => ' ',
        StyleHint::ShortTime => '!',
    };
    format!(
        "[{}{}] {:>4}s {marker}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.remaining_label
    )
}

#[derive(Serialize)]
struct JsonLine<'a> {
    at: String,
    event: &'a PlaybackEvent,
}

pub struct JsonPresenter<W> {
    out: W,
    include_progress: bool,
}

impl<W: Write + Send> JsonPresenter<W> {
    pub fn new(out: W, include_progress: bool) -> Self {
        Self {
            out,
            include_progress,
        }
    }

    fn emit(&mut self, event: PlaybackEvent) -> Result<(), PresentError> {
        let line = JsonLine {
            at: Utc::now().to_rfc3339(),
            event: &event,
        };
        let json = serde_json::to_string(&line).map_err(|e| PresentError {
            message: format!("cannot encode event: {e}"),
            source: Some(Box::new(e)),
        })?;
        writeln!(self.out, "{json}")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> Presenter for JsonPresenter<W> {
    fn playback_started(&mut self) -> Result<(), PresentError> {
        self.emit(PlaybackEvent::PlaybackStarted)
    }

    fn announce(&mut self, label: &str) -> Result<(), PresentError> {
        self.emit(PlaybackEvent::Announce {
            label: label.to_string(),
        })
    }

    fn progress(&mut self, progress: &Progress) -> Result<(), PresentError> {
        if !self.include_progress {
            return Ok(());
        }
        self.emit(PlaybackEvent::Progress(progress.clone()))
    }

    fn cue(&mut self, cue: Cue) -> Result<(), PresentError> {
        self.emit(cue.into())
    }

    fn playback_reset(&mut self) -> Result<(), PresentError> {
        self.emit(PlaybackEvent::PlaybackReset)
    }
}
