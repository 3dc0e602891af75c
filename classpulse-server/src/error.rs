//! HTTP error responses.

use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error returned by handlers, rendered as `{"message": ...}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    /// Store or task failure; the cause has already been logged
    Internal(&'static str),
}

impl ApiError {
    /// Log `cause` and hide it behind the endpoint's generic `message`.
    pub fn internal(message: &'static str, cause: impl Display) -> Self {
        tracing::error!(error = %cause, "{}", message);
        ApiError::Internal(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
