//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes. The JSON body is what
//! the back-office shows in its error toast.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::analytics::FunnelError;
use crate::models::ValidationError;
use crate::repo::RepoError;
use crate::store::StoreError;
use crate::theme::PreferenceError;
use crate::wizard::WizardError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row is not in a state that allows the operation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Hosted backend rejected the request or could not be reached
    #[error("Backend error: {0}")]
    Backend(String),

    /// Store layer error
    #[error("Storage error: {0}")]
    Storage(StoreError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable (dependency down)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } | StoreError::UnknownTable(_) => {
                ApiError::NotFound(err.to_string())
            }
            StoreError::ImmutableColumn(_) => ApiError::Validation(err.to_string()),
            StoreError::Backend { status: 409, .. } => ApiError::Conflict(err.to_string()),
            // other 4xx from the backend mean the row itself was rejected
            StoreError::Backend { status, .. } if (400..500).contains(&status) => {
                ApiError::Validation(err.to_string())
            }
            StoreError::Backend { .. } | StoreError::Request(_) | StoreError::Timeout => {
                ApiError::Backend(err.to_string())
            }
            other => ApiError::Storage(other),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(e) => e.into(),
            RepoError::Store(e) => e.into(),
            RepoError::Conflict(message) => ApiError::Conflict(message),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<WizardError> for ApiError {
    fn from(err: WizardError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<FunnelError> for ApiError {
    fn from(err: FunnelError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<PreferenceError> for ApiError {
    fn from(err: PreferenceError) -> Self {
        match err {
            PreferenceError::InvalidKey(_) => ApiError::Validation(err.to_string()),
            PreferenceError::Io(e) => ApiError::Io(e),
            PreferenceError::Serialization(e) => ApiError::Internal(e),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Backend(_) => (StatusCode::BAD_GATEWAY, "BACKEND_ERROR"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let not_found: ApiError = StoreError::not_found("leads", "abc").into();
        assert_eq!(not_found.status_and_code().0, StatusCode::NOT_FOUND);

        let rejected: ApiError = StoreError::Backend {
            status: 400,
            message: "invalid input syntax for type uuid".to_string(),
        }
        .into();
        assert_eq!(rejected.status_and_code().0, StatusCode::BAD_REQUEST);

        let duplicate: ApiError = StoreError::Backend {
            status: 409,
            message: "duplicate key".to_string(),
        }
        .into();
        assert_eq!(duplicate.status_and_code().0, StatusCode::CONFLICT);

        let down: ApiError = StoreError::Backend {
            status: 503,
            message: "unavailable".to_string(),
        }
        .into();
        assert_eq!(down.status_and_code(), (StatusCode::BAD_GATEWAY, "BACKEND_ERROR"));

        let timeout: ApiError = StoreError::Timeout.into();
        assert_eq!(timeout.status_and_code().0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_repo_error_mapping() {
        let conflict: ApiError = RepoError::Conflict("closed".to_string()).into();
        assert_eq!(conflict.status_and_code().0, StatusCode::CONFLICT);

        let invalid: ApiError = RepoError::Validation(ValidationError::new("email", "is required")).into();
        assert_eq!(invalid.to_string(), "Validation error: email: is required");
    }
}
