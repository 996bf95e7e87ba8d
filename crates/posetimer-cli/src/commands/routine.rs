use clap::Subcommand;
use posetimer_core::Config;
use serde::Serialize;

use super::RoutineSource;

#[derive(Subcommand)]
pub enum RoutineAction {
    /// List intervals with their start offsets
    Show {
        #[command(flatten)]
        source: RoutineSource,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate routine text; exits non-zero on the first bad line
    Check {
        #[command(flatten)]
        source: RoutineSource,
    },
}

#[derive(Serialize)]
struct IntervalRow<'a> {
    index: usize,
    label: &'a str,
    duration_secs: f64,
    starts_at_secs: f64,
}

pub fn run(action: RoutineAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        RoutineAction::Show { source, json } => {
            let routine = source.load(&config)?;
            if json {
                let rows: Vec<IntervalRow> = routine
                    .iter()
                    .enumerate()
                    .map(|(index, interval)| IntervalRow {
                        index,
                        label: interval.label(),
                        duration_secs: interval.duration_secs(),
                        starts_at_secs: routine.cumulative_secs(index),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for (index, interval) in routine.iter().enumerate() {
                    println!(
                        "{:>3}  {:>8}  {:>6}s  {}",
                        index + 1,
                        format_clock(routine.cumulative_secs(index)),
                        interval.duration_secs(),
                        interval.label()
                    );
                }
                println!(
                    "{} intervals, total {}",
                    routine.len(),
                    format_clock(routine.total_duration_secs())
                );
            }
        }
        RoutineAction::Check { source } => {
            let routine = source.load(&config)?;
            println!(
                "ok: {} intervals, total {}",
                routine.len(),
                format_clock(routine.total_duration_secs())
            );
        }
    }
    Ok(())
}

/// `m:ss` rendering of a second count, e.g. 95.0 -> "1:35".
fn format_clock(secs: f64) -> String {
    let total = secs.round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
