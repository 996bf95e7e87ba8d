pub mod config;
pub mod routine;
pub mod run;

use std::path::PathBuf;

use clap::Args;
use posetimer_core::{parse, Config, Routine};

/// Where routine text comes from.
#[derive(Args, Debug)]
pub struct RoutineSource {
    /// Routine text, one `<label>,<seconds>` per line. Defaults to the
    /// configured routine, or the built-in one.
    pub text: Option<String>,

    /// Read routine text from a file
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
}

impl RoutineSource {
    /// Parse the selected routine. Any malformed line is an error.
    pub fn load(&self, config: &Config) -> Result<Routine, Box<dyn std::error::Error>> {
        let routine = match (&self.text, &self.file) {
            (Some(text), _) => parse(text)?,
            (None, Some(path)) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
                parse(&text)?
            }
            (None, None) => config.routine()?,
        };
        Ok(routine)
    }
}
