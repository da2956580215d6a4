//! Document store endpoints: the `/api/files` proxy.
//!
//! `GET /api/files?action={list|content|sha|history}&path=...&limit=...`
//! and `POST /api/files` with `{action: "update"|"upload", ...}`. Store
//! failures collapse to the generic failure envelope; there is no retry
//! and no transient/permanent distinction.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;

use crate::store::StoreError;

use super::routes::AppState;
use super::types::{error_json, ok_json, WriteResult};

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    pub action: Option<String>,
    pub path: Option<String>,
    pub limit: Option<usize>,
}

pub async fn get_files(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FilesQuery>,
) -> Response {
    let path = q.path.as_deref().unwrap_or("");
    let action = q.action.as_deref().unwrap_or("list");

    match action {
        "list" => respond(state.listing(path).await),
        "content" => respond(state.store.file_content(path).await),
        "sha" => respond(state.store.file_sha(path).await),
        "history" => {
            let limit = q.limit.unwrap_or(10);
            respond(state.store.history(path, limit).await)
        }
        _ => error_json(StatusCode::BAD_REQUEST, "Invalid action"),
    }
}

fn respond<T: serde::Serialize>(result: Result<T, StoreError>) -> Response {
    match result {
        Ok(data) => ok_json(data),
        Err(e) => {
            tracing::warn!("Content store fetch failed: {}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch data")
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesMutation {
    pub action: String,
    // update
    pub path: Option<String>,
    pub content: Option<String>,
    pub message: Option<String>,
    pub sha: Option<String>,
    // upload
    pub folder_path: Option<String>,
    pub file_name: Option<String>,
    pub file_content: Option<String>,
    pub commit_message: Option<String>,
}

pub async fn post_files(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FilesMutation>,
) -> Response {
    match body.action.as_str() {
        "update" => update(&state, body).await,
        "upload" => upload(&state, body).await,
        _ => error_json(StatusCode::BAD_REQUEST, "Invalid action"),
    }
}

async fn update(state: &AppState, body: FilesMutation) -> Response {
    let (Some(path), Some(content), Some(message), Some(sha)) =
        (body.path, body.content, body.message, body.sha)
    else {
        return error_json(
            StatusCode::BAD_REQUEST,
            "update requires path, content, message and sha",
        );
    };

    match state.store.update_file(&path, &content, &message, &sha).await {
        Ok(()) => write_ok(),
        Err(e) => write_failed(&path, e),
    }
}

async fn upload(state: &AppState, body: FilesMutation) -> Response {
    let (Some(file_name), Some(file_content)) = (body.file_name, body.file_content) else {
        return error_json(
            StatusCode::BAD_REQUEST,
            "upload requires fileName and fileContent",
        );
    };

    let full_path = match body.folder_path.as_deref() {
        Some(folder) if !folder.is_empty() => format!("{}/{}", folder, file_name),
        _ => file_name.clone(),
    };
    let message = body
        .commit_message
        .unwrap_or_else(|| format!("Upload {}", file_name));

    match state.store.create_file(&full_path, &file_content, &message).await {
        Ok(()) => write_ok(),
        Err(e) => write_failed(&full_path, e),
    }
}

fn write_ok() -> Response {
    Json(WriteResult {
        success: true,
        error: None,
    })
    .into_response()
}

/// Write failures keep the 200 `{success: false}` shape; a conflict is
/// reported in the error string so the caller can re-read and retry.
fn write_failed(path: &str, error: StoreError) -> Response {
    tracing::warn!(path = %path, "Content store write failed: {}", error);
    let message = match error {
        StoreError::Conflict { .. } => "Write conflict: file changed since it was read".to_string(),
        other => other.to_string(),
    };
    Json(WriteResult {
        success: false,
        error: Some(message),
    })
    .into_response()
}
