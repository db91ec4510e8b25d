//! Mapping of engine errors to HTTP responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use coursewise_core::EngineError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Handler error, rendered as `ErrorResponse`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                code: code.to_string(),
            },
        }
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", error)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::UserNotFound(id) => Self::new(
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                format!(
                    "user not found: {}. Register with POST /api/users or send `start` to /api/chat",
                    id
                ),
            ),
            EngineError::UserExists(_) => {
                Self::new(StatusCode::CONFLICT, "USER_EXISTS", err.to_string())
            }
            EngineError::InvalidInput(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", err.to_string())
            }
            EngineError::ServiceUnavailable(detail) => {
                warn!(error = %detail, "request failed on an unavailable dependency");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "recommendation service is temporarily unavailable, try again shortly",
                )
            }
            EngineError::StoreWriteFailure(detail) => {
                warn!(error = %detail, "store write failed after retries");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_WRITE_FAILURE",
                    "could not save your data, try again shortly",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_maps_to_status_codes() {
        let cases = [
            (EngineError::UserNotFound("u1".into()), StatusCode::NOT_FOUND),
            (EngineError::UserExists("u1".into()), StatusCode::CONFLICT),
            (EngineError::InvalidInput("limit".into()), StatusCode::BAD_REQUEST),
            (
                EngineError::ServiceUnavailable("timeout".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                EngineError::StoreWriteFailure("locked".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_unavailable_hides_backend_detail() {
        let err = ApiError::from(EngineError::ServiceUnavailable("libsql: locked".into()));
        assert!(!err.body.error.contains("libsql"));
        assert_eq!(err.body.code, "SERVICE_UNAVAILABLE");
    }
}
