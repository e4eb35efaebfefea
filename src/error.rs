//! Error types for prwatch.

use thiserror::Error;

/// Common error type for prwatch.
#[derive(Error, Debug)]
pub enum PrwatchError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Feed fetch or parse error.
    #[error("feed error: {0}")]
    Feed(String),

    /// Code-hosting API error.
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// Chat transport error.
    #[error("chat error: {0}")]
    Chat(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for configuration values.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for prwatch operations.
pub type Result<T> = std::result::Result<T, PrwatchError>;
