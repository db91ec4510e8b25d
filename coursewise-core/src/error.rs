//! Error types for the recommendation engine

use thiserror::Error;

/// Result type alias using the engine's error type
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced to engine callers.
///
/// Collaborator failures are converted at module boundaries, so store and
/// HTTP client errors never appear here in raw form.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No profile exists for the user
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// A user with this id is already registered
    #[error("user already exists: {0}")]
    UserExists(String),

    /// The request itself is malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Index unreachable or timed out, or a store read failed
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A store write kept failing after retries
    #[error("store write failed: {0}")]
    StoreWriteFailure(String),
}

impl EngineError {
    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::ServiceUnavailable(_) | EngineError::StoreWriteFailure(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::UserNotFound("u1".into());
        assert_eq!(err.to_string(), "user not found: u1");
    }

    #[test]
    fn test_only_collaborator_failures_are_retryable() {
        assert!(EngineError::ServiceUnavailable("index".into()).is_retryable());
        assert!(EngineError::StoreWriteFailure("disk".into()).is_retryable());
        assert!(!EngineError::UserNotFound("u1".into()).is_retryable());
        assert!(!EngineError::InvalidInput("rating".into()).is_retryable());
    }
}
