//! Milestone tracking.
//!
//! Milestones are a fixed table mapping each major project goal to the set
//! of tracker task ids that must be DONE for it to complete. The table is
//! part of the application, not the tracker document.

use serde::Serialize;
use std::collections::HashSet;

use super::{Task, TaskStatus};

/// Lifecycle state of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
}

/// A milestone with its completion progress.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub phase: String,
    pub description: String,
    pub tasks: Vec<String>,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub status: MilestoneStatus,
}

/// Aggregate payload of the milestones view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneReport {
    pub milestones: Vec<Milestone>,
    pub completed_milestones: usize,
    /// Mean of per-milestone completion ratios, as a percentage.
    pub overall_percent: u32,
}

struct MilestoneDef {
    id: &'static str,
    name: &'static str,
    phase: &'static str,
    description: &'static str,
    tasks: &'static [&'static str],
}

const MILESTONES: &[MilestoneDef] = &[
    MilestoneDef {
        id: "m1",
        name: "Company Formation Complete",
        phase: "PHASE 1",
        description: "All foundational documents and structures in place",
        tasks: &[
            "1.1", "1.2", "1.3", "1.4", "1.5", "1.6", "1.7", "1.8", "1.9", "1.10", "1.11",
            "1.12", "1.13",
        ],
    },
    MilestoneDef {
        id: "m2",
        name: "Legal Registration",
        phase: "PHASE 2",
        description: "IPA registration, tax compliance, and licenses obtained",
        tasks: &[
            "2.1", "2.2", "2.3", "2.4", "2.5", "2.6", "2.7", "2.8", "2.9", "2.10", "2.11",
            "2.12",
        ],
    },
    MilestoneDef {
        id: "m3",
        name: "First Contract Secured",
        phase: "PHASE 3",
        description: "Signed agreement with first client",
        tasks: &["3.1", "3.2", "3.3", "3.4", "3.5"],
    },
    MilestoneDef {
        id: "m4",
        name: "Operational Ready",
        phase: "PHASE 4",
        description: "Guards hired, trained, and equipped",
        tasks: &["4.1", "4.2", "4.3", "4.4", "4.5", "4.6", "4.7"],
    },
    MilestoneDef {
        id: "m5",
        name: "Go Live",
        phase: "PHASE 5",
        description: "First deployment active",
        tasks: &["5.1", "5.2", "5.3"],
    },
];

/// Compute milestone completion against the current task list.
pub fn report(tasks: &[Task]) -> MilestoneReport {
    let done: HashSet<&str> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .map(|t| t.id.as_str())
        .collect();

    let milestones: Vec<Milestone> = MILESTONES
        .iter()
        .map(|def| {
            let completed = def.tasks.iter().filter(|id| done.contains(**id)).count();
            let status = if completed == def.tasks.len() {
                MilestoneStatus::Completed
            } else if completed > 0 {
                MilestoneStatus::InProgress
            } else {
                MilestoneStatus::Pending
            };
            Milestone {
                id: def.id.to_string(),
                name: def.name.to_string(),
                phase: def.phase.to_string(),
                description: def.description.to_string(),
                tasks: def.tasks.iter().map(|s| s.to_string()).collect(),
                completed_tasks: completed,
                total_tasks: def.tasks.len(),
                status,
            }
        })
        .collect();

    let completed_milestones = milestones
        .iter()
        .filter(|m| m.status == MilestoneStatus::Completed)
        .count();
    let overall = if milestones.is_empty() {
        0.0
    } else {
        milestones
            .iter()
            .map(|m| m.completed_tasks as f64 / m.total_tasks as f64)
            .sum::<f64>()
            / milestones.len() as f64
            * 100.0
    };

    MilestoneReport {
        milestones,
        completed_milestones,
        overall_percent: overall.round() as u32,
    }
}
