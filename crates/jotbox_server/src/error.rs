//! HTTP error mapping.
//!
//! # Invariants
//! - Every error body is `{"error": "<message>"}`.
//! - 5xx responses never carry internal detail; the cause is logged instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jotbox_core::ServiceError;
use log::error;
use serde_json::json;

pub const NO_DATA_MESSAGE: &str = "No data provided";
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";
pub const NOTE_NOT_FOUND_MESSAGE: &str = "Note not found";
const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    /// Carries the cause for the log, never for the client.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => Self::BadRequest(err.to_string()),
            ServiceError::Unauthorized => Self::Unauthorized(AUTH_REQUIRED_MESSAGE.to_string()),
            ServiceError::Conflict(message) => Self::Conflict(message),
            ServiceError::NotFound => Self::NotFound(NOTE_NOT_FOUND_MESSAGE.to_string()),
            ServiceError::Credential(message) => {
                Self::Internal(format!("credential hashing failed: {message}"))
            }
            ServiceError::Persistence(err) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::NotFound(message)
            | Self::Conflict(message) => message,
            Self::Internal(cause) => {
                error!("event=http_response module=server status=error code=500 error={cause}");
                INTERNAL_MESSAGE.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use jotbox_core::{RepoError, ServiceError, ValidationError};

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases = [
            (
                ServiceError::Validation(ValidationError::EmptyTitle),
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                ServiceError::Conflict("taken".to_string()),
                StatusCode::CONFLICT,
            ),
            (ServiceError::NotFound, StatusCode::NOT_FOUND),
            (
                ServiceError::Credential("rng".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::Persistence(RepoError::InvalidData("bad".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn validation_message_reaches_client() {
        let err = ApiError::from(ServiceError::Validation(ValidationError::EmptyTitle));
        match err {
            ApiError::BadRequest(message) => assert_eq!(message, "Title is required"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn internal_error_response_keeps_status() {
        let response = ApiError::Internal("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
