//! Core error types for ninjado-core.
//!
//! The pure calculators never fail once their inputs are constructed; every
//! error here comes from a boundary: malformed input, configuration files,
//! the local history store or an upstream history source.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ninjado-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid input rejected at the calculator boundary
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Historical data could not be fetched in full
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Invalid input to the efficiency engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A task's planned duration must be a positive number of seconds
    #[error("Invalid duration for '{field}': {value} (planned duration must be positive)")]
    InvalidDuration { field: String, value: u64 },

    /// NaN or infinite value where a finite number is required
    #[error("Non-finite value for '{field}' at index {index}: {value}")]
    NonFinite {
        field: String,
        index: usize,
        value: f64,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised while collecting historical completions.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The backing source failed for a window; the whole fetch is abandoned
    #[error("History source failed for window {window}: {message}")]
    Source { window: String, message: String },

    /// A window reaches past the representable time range
    #[error("History window {index} of {days} days is out of range")]
    WindowOutOfRange { days: u32, index: usize },

    /// Local store failure
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
