//! HTTP error responses.

use crate::analysis::AggregateError;
use crate::client::ClientError;
use crate::models::ErrorResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to HTTP callers as `{"error": ...}` bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote service credential is missing.
    #[error("AI model not configured. Check API key.")]
    Configuration,

    /// The request body is missing fields or holds out-of-range values.
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// The remote service call failed.
    #[error("Failed to get analysis from AI model.")]
    Service(#[source] ClientError),

    #[error("Failed to store upload.")]
    Storage(#[from] std::io::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration | ApiError::Service(_) | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        if err.is_configuration() {
            ApiError::Configuration
        } else {
            ApiError::Service(err)
        }
    }
}

impl From<AggregateError> for ApiError {
    fn from(err: AggregateError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Callers only see the generic message; the cause goes to the log.
        match &self {
            ApiError::Service(cause) => error!("Error calling the AI model: {}", cause),
            ApiError::Storage(cause) => error!("Error storing upload: {}", cause),
            ApiError::Configuration => error!("{}", self),
            ApiError::InvalidInput(_) => warn!("{}", self),
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_mapping() {
        assert!(matches!(
            ApiError::from(ClientError::NotConfigured),
            ApiError::Configuration
        ));
        assert!(matches!(
            ApiError::from(ClientError::Timeout(30)),
            ApiError::Service(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::InvalidInput("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Configuration.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Service(ClientError::EmptyResponse).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_error_hides_cause() {
        let err = ApiError::from(ClientError::Api {
            status: 403,
            body: "API key invalid".to_string(),
        });
        assert_eq!(err.to_string(), "Failed to get analysis from AI model.");
    }

    #[test]
    fn test_aggregate_error_is_invalid_input() {
        let err = ApiError::from(AggregateError::NonFinite { index: 2 });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("sample 2"));
    }
}
