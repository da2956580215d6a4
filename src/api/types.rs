//! Response envelope and shared helpers for the API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// The `{success, data}` / `{success: false, error}` envelope every
/// endpoint returns.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Bare `{success}` result for write operations.
#[derive(Debug, Serialize)]
pub struct WriteResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 200 with a success envelope.
pub fn ok_json<T: Serialize>(data: T) -> Response {
    Json(ApiResponse::ok(data)).into_response()
}

/// Error envelope with an explicit status code.
pub fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(ApiResponse::<()>::fail(message))).into_response()
}

/// Health check payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub repo: String,
    pub tracker_path: String,
}
