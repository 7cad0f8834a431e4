use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - please review it and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Visitor model errors
    #[error("Invalid visitor period distribution: {reason}")]
    InvalidPeriods { reason: String },

    // Key-value store errors
    #[error("Store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    // Telemetry errors
    #[error("Telemetry sink {sink} failed: {reason}")]
    TelemetryFailed { sink: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
