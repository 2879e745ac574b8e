//! Error types for snapshot operations.

use thiserror::Error;

/// Errors that can occur while creating or downloading snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Scope name outside the supported set.
    #[error("Invalid scope '{0}', must be one of: horizons, instances, collections")]
    InvalidScope(String),

    /// Action name outside the supported set.
    #[error("Missing or invalid action '{0}', must be one of: create, download")]
    InvalidAction(String),

    /// Configuration is missing or incomplete.
    #[error("Space configuration required: {0}")]
    ConfigMissing(String),

    /// Remote call failed (transport, URL or decode fault).
    #[error("Failed to fetch from Space: {0}")]
    FetchFailed(String),

    /// Gave up after too many 429 responses.
    #[error("Rate limited, gave up after {attempts} retries")]
    RateLimited { attempts: u32 },

    /// Archive response carried no readable body.
    #[error("No response stream for snapshot archive: {0}")]
    NoResponseStream(String),

    /// API payload did not have the expected shape.
    #[error("Unexpected response from Space: {0}")]
    UnexpectedResponse(String),

    /// Filesystem error while writing an archive.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error.
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for snapshot operations.
pub type Result<T> = core::result::Result<T, SnapshotError>;
