//! HTTP response types and error mapping
//!
//! Every non-success body has the shape `{"detail": "..."}`. Absence of a
//! company is not an [`AppError`]; handlers turn lookup misses into 404
//! themselves.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::AppError;

/// Error body shared by 404 and 500 responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// 200 with a JSON body
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// 404 with `{"detail": <detail>}`
pub fn not_found(detail: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorDetail::new(detail))).into_response()
}

/// 408 with `{"detail": "Request timed out"}`
pub fn request_timeout() -> Response {
    (
        StatusCode::REQUEST_TIMEOUT,
        Json(ErrorDetail::new("Request timed out")),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(retryable = self.is_retryable(), "Request failed: {:?}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDetail::new(format!("Server error: {self}"))),
        )
            .into_response()
    }
}
