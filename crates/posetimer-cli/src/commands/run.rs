use std::time::Duration;

use clap::Args;
use posetimer_core::{
    Config, PlaybackControl, PlaybackOutcome, Presenter, Routine, RoutinePlayer,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use super::RoutineSource;
use crate::presenter::{JsonPresenter, TerminalPresenter};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    source: RoutineSource,

    /// Print events as JSON lines instead of drawing a progress bar
    #[arg(long)]
    json: bool,

    /// With --json, leave out per-tick progress events
    #[arg(long, requires = "json")]
    no_progress: bool,

    /// Milliseconds between ticks (overrides playback.tick_ms)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Do not ring the terminal bell on cues
    #[arg(long)]
    no_bell: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    // Parse before anything starts; a bad routine never plays.
    let routine = args.source.load(&config)?;

    let tick = match args.tick_ms {
        Some(0) => return Err("--tick-ms must be greater than zero".into()),
        Some(ms) => Duration::from_millis(ms),
        None => config.tick(),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async {
        if args.json {
            let presenter = JsonPresenter::new(std::io::stdout(), !args.no_progress);
            play(routine, presenter, tick, &config).await
        } else {
            let presenter = TerminalPresenter::new(
                std::io::stdout(),
                config.presenter.bell && !args.no_bell,
                &config.presenter.speak_command,
            );
            play(routine, presenter, tick, &config).await
        }
    });
    // The stdin reader sits in a blocking read that cannot be cancelled.
    runtime.shutdown_background();

    let outcome = result?;
    if !args.json {
        match outcome {
            PlaybackOutcome::Completed { intervals } => {
                println!("Completed {intervals} interval(s).")
            }
            PlaybackOutcome::Cancelled { completed, .. } => {
                println!("Cancelled after {completed} interval(s).")
            }
            PlaybackOutcome::Ignored => {}
        }
    }
    Ok(())
}

async fn play<P: Presenter>(
    routine: Routine,
    presenter: P,
    tick: Duration,
    config: &Config,
) -> Result<PlaybackOutcome, Box<dyn std::error::Error>> {
    let control = PlaybackControl::new();
    let mut player = RoutinePlayer::with_monotonic_clock(routine, control.clone(), presenter)
        .with_tick(tick)
        .with_thresholds(config.cues);

    let input = tokio::spawn(read_controls(control));
    let outcome = player.play().await;
    input.abort();

    Ok(outcome?)
}

/// Map stdin lines to control requests until EOF.
async fn read_controls(control: PlaybackControl) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => apply_input(&control, &line),
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin closed");
                break;
            }
        }
    }
}

/// `p` toggles pause, `r` only resumes, `c` cancels.
fn apply_input(control: &PlaybackControl, line: &str) {
    match line.trim() {
        "p" | "pause" => {
            if control.request_pause() {
                info!(label = control.pause_label(), "pause toggled");
            }
        }
        "r" | "resume" => {
            if !control.is_pause_requested() {
                debug!("resume ignored, not paused");
            } else if control.request_pause() {
                info!(label = control.pause_label(), "pause toggled");
            }
        }
        "c" | "cancel" | "q" | "quit" => {
            control.request_cancel();
        }
        "" => {}
        other => warn!(input = other, "unknown control, use `p`, `r` or `c`"),
    }
}
