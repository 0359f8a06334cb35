//! Error types for the fittrack library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fittrack operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Recurrence period outside weekly/monthly/yearly
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Goal rejected at creation time
    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    /// Log entry rejected at logging time
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Persistent record store error
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
