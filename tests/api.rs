//! End-to-end tests over the HTTP router, backed by an in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use vanguard_portal::api::{router, AppState};
use vanguard_portal::store::{CommitInfo, ContentStore, FileNode, NodeKind, StoreError};
use vanguard_portal::Config;

const TRACKER: &str = r#"# TASK TRACKER

## PHASE 1: Formation

| ID | Task | Owner | Status | Blocked By | Date Done | Notes |
|----|------|-------|--------|------------|-----------|-------|
| 1.1 | Register the company | Alice | DONE | -- | 2026-01-10 | - |
| 1.2 | Apply for tax clearance | Bob | PENDING | 1.1 | - | - |
| 1.3 | Contact insurance brokers | Alice | PENDING | 1.1 | - | - |
| 1.4 | Prepare office lease | Carol | PENDING | 1.2, 1.3 | - | - |

## PHASE 2: Operations

| ID | Task | Owner | Status | Blocked By | Date Done | Notes |
|----|------|-------|--------|------------|-----------|-------|
| 2.1 | Create onboarding handbook | Bob | IN PROGRESS | -- | - | - |
| 2.2 | Register payroll provider | Carol | BLOCKED | 2.1 | - | - |
"#;

struct MemStore {
    files: RwLock<HashMap<String, (String, String)>>,
}

impl MemStore {
    fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(
            "00_PROJECT_MANAGEMENT/TASK_TRACKER.md".to_string(),
            (TRACKER.to_string(), "sha-tracker-1".to_string()),
        );
        files.insert(
            "01_LEGAL/charter.md".to_string(),
            ("# Charter\n".to_string(), "sha-charter-1".to_string()),
        );
        Self {
            files: RwLock::new(files),
        }
    }
}

#[async_trait]
impl ContentStore for MemStore {
    async fn list_dir(&self, path: &str) -> Result<Vec<FileNode>, StoreError> {
        let files = self.files.read().await;
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };
        let mut nodes: Vec<FileNode> = files
            .iter()
            .filter(|(p, _)| p.starts_with(&prefix) && !p[prefix.len()..].contains('/'))
            .map(|(p, (_, sha))| FileNode {
                name: p[prefix.len()..].to_string(),
                path: p.clone(),
                kind: NodeKind::File,
                sha: sha.clone(),
                size: None,
                url: None,
            })
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(nodes)
    }

    async fn file_content(&self, path: &str) -> Result<String, StoreError> {
        let files = self.files.read().await;
        files
            .get(path)
            .map(|(content, _)| content.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn file_sha(&self, path: &str) -> Result<String, StoreError> {
        let files = self.files.read().await;
        files
            .get(path)
            .map(|(_, sha)| sha.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn history(&self, path: &str, limit: usize) -> Result<Vec<CommitInfo>, StoreError> {
        let commits = vec![
            CommitInfo {
                sha: "c2".to_string(),
                message: format!("Update {}", path),
                author: "Alice".to_string(),
                date: "2026-02-01T09:00:00Z".to_string(),
                url: String::new(),
            },
            CommitInfo {
                sha: "c1".to_string(),
                message: "Initial commit".to_string(),
                author: "Alice".to_string(),
                date: "2026-01-01T09:00:00Z".to_string(),
                url: String::new(),
            },
        ];
        Ok(commits.into_iter().take(limit).collect())
    }

    async fn update_file(
        &self,
        path: &str,
        content: &str,
        _message: &str,
        sha: &str,
    ) -> Result<(), StoreError> {
        let mut files = self.files.write().await;
        let Some(entry) = files.get_mut(path) else {
            return Err(StoreError::NotFound(path.to_string()));
        };
        if entry.1 != sha {
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }
        entry.0 = content.to_string();
        entry.1 = format!("{}+", sha);
        Ok(())
    }

    async fn create_file(
        &self,
        path: &str,
        content: &str,
        _message: &str,
    ) -> Result<(), StoreError> {
        let mut files = self.files.write().await;
        if files.contains_key(path) {
            return Err(StoreError::Api {
                status: 422,
                message: "path already exists".to_string(),
            });
        }
        files.insert(path.to_string(), (content.to_string(), "sha-new".to_string()));
        Ok(())
    }
}

fn app() -> axum::Router {
    let state = Arc::new(AppState::new(Config::default(), Arc::new(MemStore::new())));
    router(state)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_version_and_tracker_path() {
    let (status, body) = get_json(app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["trackerPath"], "00_PROJECT_MANAGEMENT/TASK_TRACKER.md");
}

#[tokio::test]
async fn files_list_returns_directory_entries() {
    let (status, body) = get_json(app(), "/api/files?action=list&path=01_LEGAL").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "charter.md");
    assert_eq!(entries[0]["type"], "file");
}

#[tokio::test]
async fn files_content_returns_file_text() {
    let (status, body) = get_json(app(), "/api/files?action=content&path=01_LEGAL/charter.md").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "# Charter\n");
}

#[tokio::test]
async fn files_content_missing_path_is_a_failure_envelope() {
    let (status, body) = get_json(app(), "/api/files?action=content&path=missing.md").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to fetch data");
}

#[tokio::test]
async fn files_history_honors_limit() {
    let (status, body) =
        get_json(app(), "/api/files?action=history&path=01_LEGAL/charter.md&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let commits = body["data"].as_array().unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0]["sha"], "c2");
}

#[tokio::test]
async fn files_unknown_action_is_rejected() {
    let (status, body) = get_json(app(), "/api/files?action=delete&path=x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid action");
}

#[tokio::test]
async fn update_with_current_sha_succeeds() {
    let (status, body) = post_json(
        app(),
        "/api/files",
        json!({
            "action": "update",
            "path": "01_LEGAL/charter.md",
            "content": "# Charter v2\n",
            "message": "Revise charter",
            "sha": "sha-charter-1",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn update_with_stale_sha_reports_conflict() {
    let (status, body) = post_json(
        app(),
        "/api/files",
        json!({
            "action": "update",
            "path": "01_LEGAL/charter.md",
            "content": "# Charter v2\n",
            "message": "Revise charter",
            "sha": "sha-stale",
        }),
    )
    .await;
    // Write failures keep the 200 envelope; the error string carries the cause.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Write conflict"));
}

#[tokio::test]
async fn upload_joins_folder_and_file_name() {
    let store = Arc::new(MemStore::new());
    let state = Arc::new(AppState::new(
        Config::default(),
        Arc::clone(&store) as Arc<dyn ContentStore>,
    ));
    let (status, body) = post_json(
        router(state),
        "/api/files",
        json!({
            "action": "upload",
            "folderPath": "02_FINANCE",
            "fileName": "budget.md",
            "fileContent": "# Budget\n",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let files = store.files.read().await;
    assert!(files.contains_key("02_FINANCE/budget.md"));
}

#[tokio::test]
async fn tracker_tasks_parse_in_document_order() {
    let (status, body) = get_json(app(), "/api/tracker/tasks").await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body["data"].as_array().unwrap();
    let ids: Vec<&str> = tasks.iter().map(|t| t["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["1.1", "1.2", "1.3", "1.4", "2.1", "2.2"]);
    assert_eq!(tasks[0]["phase"], "PHASE 1");
    assert_eq!(tasks[4]["phase"], "PHASE 2");
}

#[tokio::test]
async fn board_groups_and_filters() {
    let (status, body) = get_json(app(), "/api/tracker/board").await;
    assert_eq!(status, StatusCode::OK);
    let columns = body["data"]["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[0]["id"], "pending");
    assert_eq!(columns[0]["tasks"].as_array().unwrap().len(), 3);
    assert_eq!(columns[3]["tasks"].as_array().unwrap().len(), 1);

    let (_, filtered) = get_json(app(), "/api/tracker/board?phase=PHASE%202").await;
    let total: usize = filtered["data"]["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["tasks"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn critical_path_follows_the_heavier_branch() {
    let (status, body) = get_json(app(), "/api/tracker/critical-path").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    // 1.1 register (14) -> 1.2 clearance (7) -> 1.4 prepare (5) beats the
    // 1.3 contact (3) branch.
    let path: Vec<&str> = data["path"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(path, vec!["1.1", "1.2", "1.4"]);
    assert_eq!(data["totalDays"], 26);
    assert_eq!(data["remainingDays"], 12);
    assert_eq!(data["tasks"].as_array().unwrap().len(), 3);
    // 1.1 blocks both 1.2 and 1.3.
    assert_eq!(data["bottlenecks"][0]["task"]["id"], "1.1");
    assert_eq!(data["bottlenecks"][0]["blockingCount"], 2);
}

#[tokio::test]
async fn next_actions_classify_ready_and_waiting() {
    let (status, body) = get_json(app(), "/api/tracker/next-actions").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    let actions = data["actions"].as_array().unwrap();
    // 1.2 and 1.3 are startable (1.1 is DONE); 1.4 waits on both.
    let ready: Vec<&str> = actions
        .iter()
        .filter(|a| a["canStart"] == true)
        .map(|a| a["task"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(ready, vec!["1.2", "1.3"]);
    let waiting = actions
        .iter()
        .find(|a| a["task"]["id"] == "1.4")
        .unwrap();
    assert_eq!(waiting["canStart"], false);
    assert!(waiting["reason"].as_str().unwrap().starts_with("Waiting for:"));

    assert_eq!(data["inProgress"][0]["id"], "2.1");
    assert_eq!(data["blocked"][0]["task"]["id"], "2.2");
    assert_eq!(data["summary"]["total"], 6);
}

#[tokio::test]
async fn milestones_report_completion() {
    let (status, body) = get_json(app(), "/api/tracker/milestones").await;
    assert_eq!(status, StatusCode::OK);
    let milestones = body["data"]["milestones"].as_array().unwrap();
    assert_eq!(milestones.len(), 5);
    let m1 = &milestones[0];
    assert_eq!(m1["id"], "m1");
    // Only 1.1 of m1's task set is DONE.
    assert_eq!(m1["completedTasks"], 1);
    assert_eq!(m1["status"], "in-progress");
}

#[tokio::test]
async fn summary_counts_by_status() {
    let (status, body) = get_json(app(), "/api/tracker/summary").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total"], 6);
    assert_eq!(data["done"], 1);
    assert_eq!(data["pending"], 3);
    assert_eq!(data["inProgress"], 1);
    assert_eq!(data["blocked"], 1);
    assert_eq!(data["completionPercent"], 17);
}
