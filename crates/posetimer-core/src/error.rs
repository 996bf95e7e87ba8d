//! Core error types for posetimer-core.
//!
//! This module defines the error hierarchy using thiserror. Parse errors are
//! fatal and surface before playback starts; presentation errors propagate
//! out of the playback task unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for posetimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Routine text could not be parsed
    #[error("Routine error: {0}")]
    Parse(#[from] ParseError),

    /// A presenter call failed during playback
    #[error("Presentation error: {0}")]
    Presentation(#[from] PresentError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Routine parse errors. Line numbers are 1-based over the raw input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Line did not split into exactly `<label>,<duration>`
    #[error("line {line}: expected `<label>,<duration>`, found {fields} field(s)")]
    MalformedLine { line: usize, fields: usize },

    /// Duration field is not a number
    #[error("line {line}: duration '{token}' is not a number")]
    InvalidDuration { line: usize, token: String },

    /// Duration is zero, negative or not finite
    #[error("line {line}: duration must be a positive number of seconds, got {value}")]
    NonPositiveDuration { line: usize, value: f64 },

    /// Label field is empty
    #[error("line {line}: label is empty")]
    EmptyLabel { line: usize },
}

impl ParseError {
    /// The 1-based input line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            ParseError::MalformedLine { line, .. }
            | ParseError::InvalidDuration { line, .. }
            | ParseError::NonPositiveDuration { line, .. }
            | ParseError::EmptyLabel { line } => *line,
        }
    }
}

/// Failure reported by a presenter (display, speech, sound).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct PresentError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PresentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl From<std::io::Error> for PresentError {
    fn from(err: std::io::Error) -> Self {
        Self {
            message: format!("output failed: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
