//! Tracker document parsing.
//!
//! A single sequential scan: `## PHASE n:` headings update the current
//! phase, pipe-delimited rows under a heading become tasks. Rows that do
//! not match the table pattern, carry a status outside the enum, or appear
//! before the first phase heading are dropped without error.

use regex::Regex;
use std::sync::OnceLock;

use super::{estimated_days, priority_of, Task, TaskStatus};

fn phase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"## (PHASE \d+):").expect("valid phase regex"))
}

/// Canonical 7-column row: id, description, owner, status, blockedBy,
/// dateDone, notes.
fn row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\|\s*(\d+\.\d+)\s*\|([^|]+)\|([^|]+)\|\s*(PENDING|IN PROGRESS|DONE|BLOCKED)\s*\|([^|]+)\|([^|]+)\|([^|]+)\|",
        )
        .expect("valid row regex")
    })
}

/// Short 5-column row: some historical sections of the tracker omit the
/// dateDone and notes columns.
fn short_row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\|\s*(\d+\.\d+)\s*\|([^|]+)\|([^|]+)\|\s*(PENDING|IN PROGRESS|DONE|BLOCKED)\s*\|([^|]+)\|",
        )
        .expect("valid short row regex")
    })
}

/// Parse the full tracker document into tasks, in document order.
pub fn parse_tracker(content: &str) -> Vec<Task> {
    let mut tasks = Vec::new();
    let mut current_phase: Option<String> = None;

    for line in content.lines() {
        if let Some(caps) = phase_re().captures(line) {
            current_phase = Some(caps[1].to_string());
            continue;
        }

        let Some(phase) = current_phase.as_deref() else {
            continue;
        };

        let (caps, full) = match row_re().captures(line) {
            Some(c) => (c, true),
            None => match short_row_re().captures(line) {
                Some(c) => (c, false),
                None => continue,
            },
        };

        // The status alternative in the pattern guarantees this parses.
        let Some(status) = TaskStatus::parse(caps[4].trim()) else {
            continue;
        };

        let description = caps[2].trim().to_string();
        tasks.push(Task {
            id: caps[1].to_string(),
            owner: caps[3].trim().to_string(),
            status,
            blocked_by: caps[5].trim().to_string(),
            date_done: if full { caps[6].trim().to_string() } else { String::new() },
            notes: if full { caps[7].trim().to_string() } else { String::new() },
            phase: phase.to_string(),
            priority: priority_of(&description),
            estimated_days: estimated_days(&description),
            description,
        });
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Priority;

    const DOC: &str = "\
# Task Tracker

## PHASE 1: Foundation

| ID | Task | Owner | Status | Blocked By | Date Done | Notes |
|----|------|-------|--------|------------|-----------|-------|
| 1.1 | prepare founding documents | Roger | DONE | -- | 2024-01-10 | signed |
| 1.2 | register the company | Consultant | IN PROGRESS | 1.1 | -- | -- |
| 1.3 | contact bank for accounts | Roger | PENDING | 1.2 | -- | -- |

## PHASE 2: Licensing

| 2.1 | apply for security clearance | Ops | BLOCKED | 1.2 | -- | -- |
| 2.2 | invalid row status | Ops | CANCELLED | -- | -- | -- |
";

    #[test]
    fn parses_well_formed_rows_in_document_order() {
        let tasks = parse_tracker(DOC);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1.1", "1.2", "1.3", "2.1"]);
    }

    #[test]
    fn out_of_enum_status_rows_are_dropped() {
        let tasks = parse_tracker(DOC);
        assert!(tasks.iter().all(|t| t.id != "2.2"));
    }

    #[test]
    fn phase_attribution_follows_last_heading() {
        let tasks = parse_tracker(DOC);
        assert_eq!(tasks[0].phase, "PHASE 1");
        assert_eq!(tasks[3].phase, "PHASE 2");
    }

    #[test]
    fn rows_before_any_phase_heading_are_ignored() {
        let doc = "| 0.1 | stray row | X | PENDING | -- | -- | -- |\n## PHASE 1: Start\n| 1.1 | real row | X | PENDING | -- | -- | -- |\n";
        let tasks = parse_tracker(doc);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "1.1");
    }

    #[test]
    fn short_rows_parse_without_trailing_columns() {
        let doc = "## PHASE 3: Contracts\n| 3.1 | contact first client | Roger | PENDING | -- |\n";
        let tasks = parse_tracker(doc);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "3.1");
        assert_eq!(tasks[0].date_done, "");
        assert_eq!(tasks[0].notes, "");
    }

    #[test]
    fn derived_fields_are_populated() {
        let tasks = parse_tracker(DOC);
        // "register the company" hits the 14-day rule
        assert_eq!(tasks[1].estimated_days, 14);
        // "apply for security clearance" hits the 7-day rule
        assert_eq!(tasks[3].estimated_days, 7);
        assert_eq!(tasks[0].priority, Priority::Low);
    }

    #[test]
    fn separator_and_header_rows_produce_no_tasks() {
        let doc = "## PHASE 1: X\n| ID | Task | Owner | Status | Blocked By | Date Done | Notes |\n|----|------|-------|--------|------------|-----------|-------|\n";
        assert!(parse_tracker(doc).is_empty());
    }
}
