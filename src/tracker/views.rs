//! Derived views over the task list: next actions, Kanban grouping and
//! summary rollups. Nothing here touches the dependency engine beyond
//! set membership over `blockedBy`.

use std::collections::HashSet;

use serde::Serialize;

use super::{Priority, Task, TaskStatus};

/// Urgency ladder for the next-actions view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    High,
    Medium,
    Low,
}

/// One entry of the next-actions list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub task: Task,
    pub reason: String,
    pub urgency: Urgency,
    pub can_start: bool,
    /// Unresolved blockers, present only when the task is waiting.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<Task>,
}

/// A BLOCKED task with its unresolved blockers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTask {
    pub task: Task,
    pub blockers: Vec<Task>,
}

/// Full payload of the next-actions view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextActions {
    pub actions: Vec<ActionItem>,
    pub in_progress: Vec<Task>,
    pub blocked: Vec<BlockedTask>,
    pub summary: TrackerSummary,
}

/// Prioritize PENDING tasks by dependency state and urgency.
///
/// Startable tasks (every listed dependency DONE, or none listed) sort
/// first; within each group the urgency ladder decides, and document
/// order breaks remaining ties.
pub fn next_actions(tasks: &[Task]) -> Vec<ActionItem> {
    let done: HashSet<&str> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .map(|t| t.id.as_str())
        .collect();

    let mut actions: Vec<ActionItem> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .map(|task| classify(task, tasks, &done))
        .collect();

    actions.sort_by(|a, b| {
        b.can_start
            .cmp(&a.can_start)
            .then(a.urgency.cmp(&b.urgency))
    });
    actions
}

fn classify(task: &Task, tasks: &[Task], done: &HashSet<&str>) -> ActionItem {
    if task.has_no_dependencies() {
        return ActionItem {
            task: task.clone(),
            reason: "No dependencies".to_string(),
            urgency: startable_urgency(task.priority),
            can_start: true,
            blocked_by: Vec::new(),
        };
    }

    let unresolved: Vec<Task> = task
        .blockers()
        .iter()
        .filter(|id| !done.contains(**id))
        .filter_map(|id| tasks.iter().find(|t| t.id == **id).cloned())
        .collect();

    if unresolved.is_empty() {
        ActionItem {
            task: task.clone(),
            reason: "All dependencies completed".to_string(),
            urgency: startable_urgency(task.priority),
            can_start: true,
            blocked_by: Vec::new(),
        }
    } else {
        let urgency = if unresolved.iter().any(|b| b.status == TaskStatus::InProgress) {
            Urgency::High
        } else {
            Urgency::Medium
        };
        let names: Vec<&str> = unresolved.iter().map(|b| b.description.as_str()).collect();
        ActionItem {
            task: task.clone(),
            reason: format!("Waiting for: {}", names.join(", ")),
            urgency,
            can_start: false,
            blocked_by: unresolved,
        }
    }
}

fn startable_urgency(priority: Priority) -> Urgency {
    match priority {
        Priority::High => Urgency::Critical,
        Priority::Medium => Urgency::High,
        Priority::Low => Urgency::Medium,
    }
}

/// BLOCKED tasks with their unresolved blockers, in document order.
pub fn blocked_tasks(tasks: &[Task]) -> Vec<BlockedTask> {
    let done: HashSet<&str> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .map(|t| t.id.as_str())
        .collect();

    tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Blocked)
        .map(|task| BlockedTask {
            task: task.clone(),
            blockers: task
                .blockers()
                .iter()
                .filter(|id| !done.contains(**id))
                .filter_map(|id| tasks.iter().find(|t| t.id == **id).cloned())
                .collect(),
        })
        .collect()
}

/// Tasks currently IN PROGRESS, in document order.
pub fn in_progress(tasks: &[Task]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.status == TaskStatus::InProgress)
        .cloned()
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────
// Kanban board
// ─────────────────────────────────────────────────────────────────────────

/// Fixed status-to-column mapping of the board.
const COLUMNS: [(&str, &str, TaskStatus); 4] = [
    ("pending", "To Do", TaskStatus::Pending),
    ("in-progress", "In Progress", TaskStatus::InProgress),
    ("blocked", "Blocked", TaskStatus::Blocked),
    ("done", "Done", TaskStatus::Done),
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub columns: Vec<BoardColumn>,
    pub phases: Vec<String>,
    pub total: usize,
    pub done: usize,
}

/// Group tasks into board columns, optionally filtered by phase and a
/// case-insensitive substring over id + description.
pub fn board(tasks: &[Task], phase: Option<&str>, query: Option<&str>) -> Board {
    let needle = query.map(str::to_lowercase).unwrap_or_default();
    let filtered: Vec<&Task> = tasks
        .iter()
        .filter(|t| phase.map_or(true, |p| t.phase == p))
        .filter(|t| {
            needle.is_empty()
                || t.description.to_lowercase().contains(&needle)
                || t.id.to_lowercase().contains(&needle)
        })
        .collect();

    let columns = COLUMNS
        .iter()
        .map(|&(id, title, status)| BoardColumn {
            id: id.to_string(),
            title: title.to_string(),
            status,
            tasks: filtered
                .iter()
                .filter(|t| t.status == status)
                .map(|t| (*t).clone())
                .collect(),
        })
        .collect();

    let mut phases: Vec<String> = tasks.iter().map(|t| t.phase.clone()).collect();
    phases.sort();
    phases.dedup();

    Board {
        columns,
        phases,
        total: tasks.len(),
        done: tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count(),
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Summary rollups
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSummary {
    pub phase: String,
    pub total: usize,
    pub done: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSummary {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub blocked: usize,
    pub ready: usize,
    /// Completed percentage over all tasks, rounded to the nearest integer.
    pub completion_percent: u32,
    pub phases: Vec<PhaseSummary>,
}

/// Totals by status, per-phase rollups, and overall completion.
pub fn summary(tasks: &[Task]) -> TrackerSummary {
    let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
    let done = count(TaskStatus::Done);
    let ready = next_actions(tasks)
        .iter()
        .filter(|a| a.can_start)
        .count();

    let mut phases: Vec<PhaseSummary> = Vec::new();
    for task in tasks {
        match phases.iter_mut().find(|p| p.phase == task.phase) {
            Some(p) => {
                p.total += 1;
                if task.status == TaskStatus::Done {
                    p.done += 1;
                }
            }
            None => phases.push(PhaseSummary {
                phase: task.phase.clone(),
                total: 1,
                done: (task.status == TaskStatus::Done) as usize,
            }),
        }
    }

    TrackerSummary {
        total: tasks.len(),
        done,
        in_progress: count(TaskStatus::InProgress),
        pending: count(TaskStatus::Pending),
        blocked: count(TaskStatus::Blocked),
        ready,
        completion_percent: if tasks.is_empty() {
            0
        } else {
            ((done as f64 / tasks.len() as f64) * 100.0).round() as u32
        },
        phases,
    }
}
