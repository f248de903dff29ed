//! Error types for tcg_tracker

use thiserror::Error;

/// Unified error type for catalog reads and collection storage
#[derive(Debug, Error)]
pub enum TrackerError {
    /// An upstream read did not succeed. Transport errors, non-success
    /// statuses and undecodable bodies all end up here.
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// A card without an id cannot be stored
    #[error("Card id must not be empty")]
    EmptyCardId,

    /// File I/O error in durable storage
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or parse persisted data
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrackerError {
    pub(crate) fn fetch_failed(url: &str, reason: impl ToString) -> Self {
        TrackerError::FetchFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for the generic "fetch failed" condition
    pub fn is_fetch_failed(&self) -> bool {
        matches!(self, TrackerError::FetchFailed { .. })
    }
}

/// Result alias for tcg_tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
