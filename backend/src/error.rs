//! Application error handling
//!
//! Converts internal errors to HTTP responses with a stable JSON body.
//! Session failures arrive pre-collapsed into the coarse taxonomy; nothing
//! below this layer leaks stack traces or sub-check detail to callers.

use crate::auth::SessionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use openfeed_shared::types::{ErrorDetail, ErrorResponse};
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Conflict => {
                ApiError::Conflict("Email or username is already taken".to_string())
            }
            SessionError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            SessionError::InvalidSession => ApiError::Unauthorized("Invalid session".to_string()),
            SessionError::NotFound => ApiError::NotFound("Account not found".to_string()),
            SessionError::Validation(msg) => ApiError::Validation(msg),
            SessionError::Store(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field: None,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_error_status() {
        let error: ApiError = SessionError::Conflict.into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_invalid_credentials_and_session_share_status() {
        let credentials: ApiError = SessionError::InvalidCredentials.into();
        let session: ApiError = SessionError::InvalidSession.into();
        assert_eq!(
            credentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(session.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_not_found_error_status() {
        let error = ApiError::NotFound("Account not found".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_error_is_opaque() {
        let error: ApiError = SessionError::Store(anyhow::anyhow!("connection refused")).into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
