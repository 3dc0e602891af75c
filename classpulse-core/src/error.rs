//! Error types for classpulse-core

use thiserror::Error;

/// Main error type for the classpulse-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A record in an import file failed validation
    #[error("invalid activity record at index {index}: {message}")]
    InvalidRecord { index: usize, message: String },
}

/// Result type alias for classpulse-core
pub type Result<T> = std::result::Result<T, Error>;
