//! Task tracker endpoints: the derived project-management views.
//!
//! Every handler re-reads the tracker document (through the cache) and
//! recomputes its view from scratch; tasks have no identity across
//! reloads beyond their id strings.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;
use crate::tracker::{self, graph, milestones as milestone_view, views, Task};

use super::routes::AppState;
use super::types::{error_json, ok_json};

async fn load_tasks(state: &AppState) -> Result<Vec<Task>, StoreError> {
    let text = state.tracker_text().await?;
    Ok(tracker::parse_tracker(&text))
}

fn fetch_failed(error: StoreError) -> Response {
    tracing::warn!("Tracker load failed: {}", error);
    error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch data")
}

/// The raw parsed task list, in document order.
pub async fn tasks(State(state): State<Arc<AppState>>) -> Response {
    match load_tasks(&state).await {
        Ok(tasks) => ok_json(tasks),
        Err(e) => fetch_failed(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    pub phase: Option<String>,
    pub q: Option<String>,
}

/// Kanban grouping with optional phase filter and search.
pub async fn board(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BoardQuery>,
) -> Response {
    match load_tasks(&state).await {
        Ok(tasks) => ok_json(views::board(
            &tasks,
            query.phase.as_deref(),
            query.q.as_deref(),
        )),
        Err(e) => fetch_failed(e),
    }
}

/// A bottleneck with its full task record attached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BottleneckView {
    task: Task,
    blocking_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CriticalPathView {
    #[serde(flatten)]
    analysis: graph::CriticalPath,
    /// Task records along the path, in path order.
    tasks: Vec<Task>,
    bottlenecks: Vec<BottleneckView>,
}

/// Critical path and bottleneck ranking.
pub async fn critical_path(State(state): State<Arc<AppState>>) -> Response {
    let tasks = match load_tasks(&state).await {
        Ok(tasks) => tasks,
        Err(e) => return fetch_failed(e),
    };

    let analysis = graph::analyze(&tasks);
    let path_tasks: Vec<Task> = analysis
        .path
        .iter()
        .filter_map(|id| tasks.iter().find(|t| &t.id == id).cloned())
        .collect();
    let bottlenecks = graph::bottlenecks(&tasks)
        .into_iter()
        .filter_map(|b| {
            tasks.iter().find(|t| t.id == b.id).map(|task| BottleneckView {
                task: task.clone(),
                blocking_count: b.blocking_count,
            })
        })
        .collect();

    ok_json(CriticalPathView {
        analysis,
        tasks: path_tasks,
        bottlenecks,
    })
}

/// Prioritized next actions with dependency context.
pub async fn next_actions(State(state): State<Arc<AppState>>) -> Response {
    match load_tasks(&state).await {
        Ok(tasks) => ok_json(views::NextActions {
            actions: views::next_actions(&tasks),
            in_progress: views::in_progress(&tasks),
            blocked: views::blocked_tasks(&tasks),
            summary: views::summary(&tasks),
        }),
        Err(e) => fetch_failed(e),
    }
}

/// Milestone completion against the fixed milestone table.
pub async fn milestones(State(state): State<Arc<AppState>>) -> Response {
    match load_tasks(&state).await {
        Ok(tasks) => ok_json(milestone_view::report(&tasks)),
        Err(e) => fetch_failed(e),
    }
}

/// Status totals and per-phase rollups.
pub async fn summary(State(state): State<Arc<AppState>>) -> Response {
    match load_tasks(&state).await {
        Ok(tasks) => ok_json(views::summary(&tasks)),
        Err(e) => fetch_failed(e),
    }
}
