//! Core error types.

use thiserror::Error;

/// Error type for configuration and filesystem operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Path error (e.g., home directory not found)
    #[error("Path error: {0}")]
    Path(String),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] observability::ObservabilityError),
}

/// Result type alias using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
