//! Task tracker domain logic.
//!
//! The tracker is a single Markdown document in the content repository:
//! tasks live in pipe-delimited table rows grouped under `## PHASE n:`
//! headings. Everything here is pure computation over the parsed rows;
//! fetching the document is the store's job.
//!
//! - `parse`: document text → ordered task list
//! - `graph`: dependency graph, critical path, bottlenecks
//! - `views`: next actions, Kanban grouping, summary rollups
//! - `milestones`: completion against the fixed milestone table

pub mod graph;
pub mod milestones;
pub mod parse;
pub mod views;

pub use graph::{analyze, bottlenecks, Bottleneck, CriticalPath};
pub use parse::parse_tracker;

use serde::{Deserialize, Serialize};

/// Sentinel used in the `blockedBy` column for "no dependencies".
pub const NO_DEPENDENCIES: &str = "--";

/// Task status, exactly the four values the tracker document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "IN PROGRESS")]
    InProgress,
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "BLOCKED")]
    Blocked,
}

impl TaskStatus {
    /// Parse a status cell. Anything outside the enum is rejected, which
    /// drops the whole row during parsing.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "IN PROGRESS" => Some(Self::InProgress),
            "DONE" => Some(Self::Done),
            "BLOCKED" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// Coarse priority derived from keywords in the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One row of the tracker document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// `<phase>.<index>` identifier, unique within the document.
    pub id: String,
    pub description: String,
    pub owner: String,
    pub status: TaskStatus,
    /// Comma-separated dependency ids, or `--` for none.
    pub blocked_by: String,
    pub date_done: String,
    pub notes: String,
    /// The `PHASE n` heading this row appeared under.
    pub phase: String,
    pub priority: Priority,
    /// Derived duration estimate, never stored in the document.
    pub estimated_days: u32,
}

impl Task {
    /// The dependency ids this task lists, with the sentinel and empty
    /// fragments stripped. Referential validity is not checked here.
    pub fn blockers(&self) -> Vec<&str> {
        if self.blocked_by == NO_DEPENDENCIES {
            return Vec::new();
        }
        self.blocked_by
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether the row declares no dependencies at all.
    pub fn has_no_dependencies(&self) -> bool {
        self.blocked_by == NO_DEPENDENCIES || self.blocked_by.trim().is_empty()
    }
}

/// Duration heuristic over the task description. First matching rule wins.
///
/// A crude proxy, recomputed identically wherever it is needed; keyword
/// matching is case-insensitive.
pub fn estimated_days(description: &str) -> u32 {
    let text = description.to_lowercase();
    if text.contains("register") || text.contains("license") {
        14
    } else if text.contains("apply") || text.contains("clearance") {
        7
    } else if text.contains("contact") || text.contains("quote") {
        3
    } else if text.contains("prepare") || text.contains("create") {
        5
    } else {
        3
    }
}

/// Priority heuristic: explicit "high"/"medium" markers in the description.
pub fn priority_of(description: &str) -> Priority {
    let text = description.to_lowercase();
    if text.contains("high") {
        Priority::High
    } else if text.contains("medium") {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[cfg(test)]
pub(crate) fn test_task(id: &str, blocked_by: &str, days: u32, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        description: format!("task {}", id),
        owner: "owner".to_string(),
        status,
        blocked_by: blocked_by.to_string(),
        date_done: String::new(),
        notes: String::new(),
        phase: "PHASE 1".to_string(),
        priority: Priority::Low,
        estimated_days: days,
    }
}
