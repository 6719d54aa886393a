//! Error types for regharvest
//!
//! One taxonomy covers the whole pipeline. The important distinction is
//! [`HarvestError::RateLimited`] versus [`HarvestError::Transport`]: the
//! former is a normal "try again later" outcome that never discards saved
//! progress, the latter is a genuinely failed or malformed exchange.

use thiserror::Error;

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Main error type for regharvest
#[derive(Error, Debug)]
pub enum HarvestError {
    /// The API signalled that the hourly request quota is exhausted.
    /// Recoverable: wait and re-run; saved progress is never lost.
    #[error("API rate limit exceeded. Wait an hour and re-run; saved progress is kept.")]
    RateLimited,

    /// Network failure, malformed response, or a missing expected field
    #[error("Transport error: {0}")]
    Transport(String),

    /// The durable record table could not be read or written
    #[error("Record table error: {0}. Delete the table file only if you accept re-fetching everything.")]
    Table(String),

    /// Run configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarvestError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a record table error
    pub fn table(msg: impl Into<String>) -> Self {
        Self::Table(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for the graceful quota outcome, false for real failures
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
