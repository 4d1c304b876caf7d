//! HTTP error envelope and domain-error mapping.
//!
//! Every non-2xx response carries the same JSON body shape:
//! `{timestamp, status, error, message, path}`, with an additional
//! `validationErrors` list on request-validation failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use verity_domain::ProfileError;

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
}

/// An error response ready to be serialized.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub path: String,
    pub validation_errors: Option<Vec<String>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self { status, message: message.into(), path: path.into(), validation_errors: None }
    }

    /// Build a 400 response carrying per-field validation messages.
    pub fn validation(path: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation failed".into(),
            path: path.into(),
            validation_errors: Some(errors),
        }
    }

    /// Map a domain error onto its HTTP status.
    ///
    /// `ProfileNotFound` and `UserNotFound` are both 404: from the caller's
    /// point of view the requested resource cannot be served either way.
    /// `UserServiceUnavailable` is 503 so clients can distinguish "retry
    /// later" from "does not exist".
    pub fn from_domain(err: ProfileError, path: impl Into<String>) -> Self {
        let status = match &err {
            ProfileError::ProfileNotFound { .. } | ProfileError::UserNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ProfileError::UserServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProfileError::Validation(_) => StatusCode::BAD_REQUEST,
            ProfileError::Database(_) | ProfileError::Config(_) | ProfileError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string(), path)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            timestamp: Utc::now(),
            status: self.status.as_u16(),
            error: self.status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.message,
            path: self.path,
            validation_errors: self.validation_errors,
        };
        (self.status, Json(body)).into_response()
    }
}
