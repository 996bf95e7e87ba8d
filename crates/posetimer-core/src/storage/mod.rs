mod config;

pub use config::{Config, PlaybackConfig, PresenterConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/posetimer[-dev]/` based on POSETIMER_ENV.
///
/// Set POSETIMER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POSETIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("posetimer-dev")
    } else {
        base_dir.join("posetimer")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
