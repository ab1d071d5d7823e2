//! Error handling utilities for route handlers

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ClassifyError;

/// Error returned from a handler, rendered as a JSON body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn bad_request(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind,
            message: message.into(),
        }
    }

    pub fn internal(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind,
            message: message.into(),
        }
    }
}

impl From<ClassifyError> for ApiError {
    fn from(e: ClassifyError) -> Self {
        ApiError::internal(e.kind(), e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Extension trait for logging errors and converting to ApiError
pub trait LogErr<T> {
    /// Log error with context and return a custom status
    fn log_status(self, context: &str, status: StatusCode, kind: &'static str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_status(self, context: &str, status: StatusCode, kind: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            log::warn!("{}: {}", context, e);
            ApiError {
                status,
                kind,
                message: format!("{}: {}", context, e),
            }
        })
    }
}

/// Log a pipeline failure and convert it
pub fn log_classify_err(context: &str, e: ClassifyError) -> ApiError {
    log::error!("{}: {}", context, e);
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_errors_are_500() {
        let err: ApiError = ClassifyError::Inference("boom".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind, "inference_error");
        assert_eq!(err.message, "inference failed: boom");
    }

    #[test]
    fn test_log_status() {
        let result: Result<(), &str> = Err("no boundary");
        let err = result
            .log_status("Multipart field error", StatusCode::BAD_REQUEST, "bad_multipart")
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Multipart field error: no boundary");
    }
}
