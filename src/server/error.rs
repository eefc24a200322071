//! HTTP error responses
//!
//! Every failure leaves the API as JSON `{ "error": ..., "details"?: ... }`.
//! `details` is only filled for server errors in debug builds.

use axum::{
    Json,
    extract::multipart::MultipartError,
    extract::multipart::MultipartRejection,
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use crate::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(err: impl std::fmt::Debug + std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
            details: cfg!(debug_assertions).then(|| format!("{:?}", err)),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Validation(_) | Error::DuplicateNip | Error::Upload(_) => StatusCode::BAD_REQUEST,
            Error::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::EmployeeNotFound(_) => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Io(_) => return ApiError::internal(err),
        };
        ApiError::new(status, err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::new(err.status(), format!("Invalid multipart request: {}", err.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::new(rejection.status(), format!("Invalid multipart request: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "Server error: {}", self.message);
        } else {
            tracing::warn!(status = %self.status, "Request rejected: {}", self.message);
        }

        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DUPLICATE_NIP_MESSAGE, PDF_ONLY_MESSAGE};

    #[test]
    fn test_status_mapping() {
        let dup = ApiError::from(Error::DuplicateNip);
        assert_eq!(dup.status, StatusCode::BAD_REQUEST);
        assert_eq!(dup.message, DUPLICATE_NIP_MESSAGE);

        let media = ApiError::from(Error::UnsupportedMediaType {
            field: "doc_ktp".into(),
            content_type: "text/plain".into(),
        });
        assert_eq!(media.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(media.message, PDF_ONLY_MESSAGE);

        assert_eq!(ApiError::from(Error::EmployeeNotFound(7)).status, StatusCode::NOT_FOUND);

        let io = ApiError::from(Error::Io(std::io::Error::other("disk full")));
        assert_eq!(io.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(io.message.contains("disk full"));
    }
}
