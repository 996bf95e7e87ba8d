//! Integration tests for routine playback under pause and cancel.
//!
//! All tests run on tokio's paused clock, so sleeps advance virtual time
//! instantly and timings are deterministic.

use std::time::Duration;

use posetimer_core::{
    parse, CoreError, Cue, PlaybackControl, PlaybackEvent, PlaybackOutcome, PlaybackState,
    PresentError, Presenter, Progress, RecordingPresenter, RoutinePlayer,
};
use tokio::time::{sleep, Instant};

fn player_for(text: &str) -> (RoutinePlayer<RecordingPresenter>, PlaybackControl, RecordingPresenter) {
    let recorder = RecordingPresenter::new();
    let control = PlaybackControl::new();
    let player =
        RoutinePlayer::with_monotonic_clock(parse(text).unwrap(), control.clone(), recorder.clone());
    (player, control, recorder)
}

#[tokio::test(start_paused = true)]
async fn test_full_routine_event_order() {
    let (mut player, control, recorder) = player_for("A,10\nB,5\n");

    let outcome = player.play().await.unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed { intervals: 2 });
    assert_eq!(control.state(), PlaybackState::Idle);
    // Intervals of 20s or less get only the final cue, never the warning.
    assert_eq!(
        recorder.milestones(),
        vec![
            PlaybackEvent::PlaybackStarted,
            PlaybackEvent::Announce { label: "A".into() },
            PlaybackEvent::FinalCue,
            PlaybackEvent::CompletionCue,
            PlaybackEvent::Announce { label: "B".into() },
            PlaybackEvent::FinalCue,
            PlaybackEvent::CompletionCue,
            PlaybackEvent::PlaybackReset,
        ]
    );

    // The tick right before each completion cue shows zero seconds left.
    let events = recorder.events();
    for (i, event) in events.iter().enumerate() {
        if *event == PlaybackEvent::CompletionCue {
            match &events[i - 1] {
                PlaybackEvent::Progress(Progress {
                    fraction,
                    remaining_label,
                    ..
                }) => {
                    assert_eq!(*fraction, 1.0);
                    assert_eq!(remaining_label, "0");
                }
                other => panic!("expected progress before completion, got {other:?}"),
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_routine_wall_clock_matches_durations() {
    let (mut player, _control, _recorder) = player_for("A,2\nB,3.5\n");

    let started = Instant::now();
    player.play().await.unwrap();
    let elapsed = started.elapsed().as_secs_f64();

    assert!((elapsed - 5.5).abs() < 0.05, "elapsed {elapsed}");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_skips_remaining_intervals() {
    let (mut player, control, recorder) = player_for("A,10\nB,10\nC,10\nD,10\nE,10\n");

    let handle = tokio::spawn(async move { player.play().await });

    sleep(Duration::from_secs(15)).await;
    assert_eq!(control.state(), PlaybackState::Running);
    assert!(control.request_cancel());

    let outcome = handle.await.unwrap().unwrap();

    assert_eq!(outcome, PlaybackOutcome::Cancelled {
            completed: 1,
            at_index: 1
        });
    assert_eq!(recorder.announced_labels(), vec!["A", "B"]);
    assert_eq!(control.state(), PlaybackState::Idle);

    let milestones = recorder.milestones();
    assert_eq!(milestones.last(), Some(&PlaybackEvent::PlaybackReset));
    let completions = milestones
        .iter()
        .filter(|e| **e == PlaybackEvent::CompletionCue)
        .count();
    assert_eq!(completions, 1);
}

#[tokio::test(start_paused = true)]
async fn test_pause_delays_completion_by_pause_time() {
    let (mut player, control, recorder) = player_for("Plank,10\n");

    let started = Instant::now();
    let handle = tokio::spawn(async move { player.play().await });

    sleep(Duration::from_secs(3)).await;
    assert!(control.request_pause());
    assert_eq!(control.pause_label(), "Resume");

    sleep(Duration::from_secs(1)).await;
    assert_eq!(control.state(), PlaybackState::Paused);
    let ticks_while_paused = recorder.events().len();

    sleep(Duration::from_secs(4)).await;
    // No progress is reported while paused.
    assert_eq!(recorder.events().len(), ticks_while_paused);
    assert!(control.request_pause());

    let outcome = handle.await.unwrap().unwrap();
    let elapsed = started.elapsed().as_secs_f64();

    assert_eq!(outcome, PlaybackOutcome::Completed { intervals: 1 });
    assert!((elapsed - 15.0).abs() < 0.05, "elapsed {elapsed}");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_is_honoured_while_paused() {
    let (mut player, control, recorder) = player_for("A,10\nB,10\n");

    let handle = tokio::spawn(async move { player.play().await });

    sleep(Duration::from_secs(2)).await;
    control.request_pause();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(control.state(), PlaybackState::Paused);

    assert!(control.request_cancel());
    let outcome = handle.await.unwrap().unwrap();

    assert_eq!(outcome, PlaybackOutcome::Cancelled {
            completed: 0,
            at_index: 0
        });
    assert_eq!(recorder.announced_labels(), vec!["A"]);
    assert_eq!(control.state(), PlaybackState::Idle);
    assert!(!control.is_pause_requested());
}

#[tokio::test(start_paused = true)]
async fn test_cues_fire_once_across_pause() {
    let (mut player, control, recorder) = player_for("Boat,30\n");

    let handle = tokio::spawn(async move { player.play().await });

    // Pause inside the warning window, after the warning fired.
    sleep(Duration::from_secs(27)).await;
    control.request_pause();
    sleep(Duration::from_secs(5)).await;
    control.request_pause();

    handle.await.unwrap().unwrap();

    let milestones = recorder.milestones();
    let count = |wanted: PlaybackEvent| milestones.iter().filter(|e| **e == wanted).count();
    assert_eq!(count(PlaybackEvent::WarningCue), 1);
    assert_eq!(count(PlaybackEvent::FinalCue), 1);
    assert_eq!(count(PlaybackEvent::CompletionCue), 1);
}

/// Presenter that fails when a given label is announced.
struct FailingPresenter {
    inner: RecordingPresenter,
    fail_on: &'static str,
}

impl Presenter for FailingPresenter {
    fn playback_started(&mut self) -> Result<(), PresentError> {
        self.inner.playback_started()
    }

    fn announce(&mut self, label: &str) -> Result<(), PresentError> {
        if label == self.fail_on {
            return Err(PresentError::new("speech engine unavailable"));
        }
        self.inner.announce(label)
    }

    fn progress(&mut self, progress: &Progress) -> Result<(), PresentError> {
        self.inner.progress(progress)
    }

    fn cue(&mut self, cue: Cue) -> Result<(), PresentError> {
        self.inner.cue(cue)
    }

    fn playback_reset(&mut self) -> Result<(), PresentError> {
        self.inner.playback_reset()
    }
}

#[tokio::test(start_paused = true)]
async fn test_presenter_failure_propagates() {
    let recorder = RecordingPresenter::new();
    let control = PlaybackControl::new();
    let presenter = FailingPresenter {
        inner: recorder.clone(),
        fail_on: "B",
    };
    let mut player =
        RoutinePlayer::with_monotonic_clock(parse("A,1\nB,1\nC,1").unwrap(), control.clone(), presenter);

    let err = player.play().await.unwrap_err();

    assert!(matches!(err, CoreError::Presentation(_)));
    assert_eq!(recorder.announced_labels(), vec!["A"]);
    assert_eq!(control.state(), PlaybackState::Idle);
    assert!(!recorder.events().contains(&PlaybackEvent::PlaybackReset));
}

#[tokio::test(start_paused = true)]
async fn test_empty_routine_completes_immediately() {
    let (mut player, control, recorder) = player_for("\n\n\n");

    let started = Instant::now();
    let outcome = player.play().await.unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed { intervals: 0 });
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(
        recorder.events(),
        vec![PlaybackEvent::PlaybackStarted, PlaybackEvent::PlaybackReset]
    );
    assert_eq!(control.state(), PlaybackState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_begin_from_input_side_then_cancel_leaves_player_usable() {
    let (mut player, control, recorder) = player_for("A,2\nB,2\n");

    assert!(control.request_begin());
    assert!(control.request_cancel());
    sleep(Duration::from_secs(5)).await;
    assert_eq!(control.state(), PlaybackState::Idle);

    let outcome = player.play().await.unwrap();
    assert_eq!(outcome, PlaybackOutcome::Completed { intervals: 2 });
    assert_eq!(recorder.announced_labels(), vec!["A", "B"]);
    assert_eq!(control.state(), PlaybackState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_begin_from_input_side_is_played_and_cancellable() {
    let (mut player, control, recorder) = player_for("A,10\nB,10\n");

    assert!(control.request_begin());
    let handle = tokio::spawn(async move { player.play().await });

    sleep(Duration::from_secs(3)).await;
    assert_eq!(control.state(), PlaybackState::Running);
    assert!(control.request_cancel());

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(
        outcome,
        PlaybackOutcome::Cancelled {
            completed: 0,
            at_index: 0
        }
    );
    assert_eq!(recorder.announced_labels(), vec!["A"]);
    assert_eq!(control.state(), PlaybackState::Idle);
    assert!(control.request_begin());
}
