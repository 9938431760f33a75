//! Error types for review operations
//!
//! Three failure classes reach callers: validation failures the user can fix,
//! reviewer service failures the caller may retry, and storage failures.

use std::time::Duration;

use thiserror::Error;

/// Errors from the persistent key-value backing store
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite rejected the read or write
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored history could not be encoded or decoded
    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while preparing the database location
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend refused the operation for another reason
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the external reviewer (LLM) service
#[derive(Error, Debug)]
pub enum LlmError {
    /// The completion did not arrive within the configured timeout
    #[error("review service timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The upstream service returned an error
    #[error("review service error: {0}")]
    Upstream(String),

    /// The upstream service answered with no review text
    #[error("review service returned an empty response")]
    EmptyResponse,
}

/// Errors from a single review request
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Input rejected before anything was read or written
    #[error("{0}")]
    Validation(String),

    /// Reviewer call failed; history was not modified
    #[error(transparent)]
    ReviewService(#[from] LlmError),

    /// History could not be read or persisted
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type alias for review operations
pub type ReviewResult<T> = Result<T, ReviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = LlmError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "review service timed out after 30s");
    }

    #[test]
    fn test_review_error_is_transparent() {
        let err: ReviewError = LlmError::EmptyResponse.into();
        assert_eq!(err.to_string(), "review service returned an empty response");
        assert!(matches!(err, ReviewError::ReviewService(_)));
    }
}
