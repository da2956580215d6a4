//! Dependency graph and critical-path analysis.
//!
//! Edges point from a dependency to its dependents. The critical path is
//! the maximum cumulative-duration path from a start task (no
//! dependencies) to an end task (nothing depends on it), computed with a
//! topological sort and a longest-path DP pass rather than path
//! enumeration, so the result is deterministic: ties are broken toward
//! the node earlier in document order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use serde::Serialize;

use super::{Task, TaskStatus};

/// Dependency graph over a task list. Node indices are document order.
pub struct DependencyGraph<'a> {
    tasks: &'a [Task],
    index: HashMap<&'a str, usize>,
    /// dependency -> dependents
    dependents: Vec<Vec<usize>>,
    /// dependent -> dependencies (resolved ids only)
    dependencies: Vec<Vec<usize>>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph. `blockedBy` references to ids not present in the
    /// task list contribute no edge.
    pub fn build(tasks: &'a [Task]) -> Self {
        let index: HashMap<&str, usize> = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        let mut dependents = vec![Vec::new(); tasks.len()];
        let mut dependencies = vec![Vec::new(); tasks.len()];

        for (i, task) in tasks.iter().enumerate() {
            for dep in task.blockers() {
                if let Some(&d) = index.get(dep) {
                    dependents[d].push(i);
                    dependencies[i].push(d);
                }
            }
        }

        Self {
            tasks,
            index,
            dependents,
            dependencies,
        }
    }

    /// Tasks with no dependencies.
    pub fn start_nodes(&self) -> Vec<usize> {
        (0..self.tasks.len())
            .filter(|&i| self.dependencies[i].is_empty())
            .collect()
    }

    /// Tasks nothing depends on.
    pub fn end_nodes(&self) -> Vec<usize> {
        (0..self.tasks.len())
            .filter(|&i| self.dependents[i].is_empty())
            .collect()
    }

    /// Total number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.dependents.iter().map(Vec::len).sum()
    }

    pub fn task_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }
}

/// Result of the critical-path analysis.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    /// Task ids on the path, in execution order.
    pub path: Vec<String>,
    /// Cumulative estimated days over the whole path.
    pub total_days: u32,
    /// Cumulative estimated days over path tasks not yet DONE.
    pub remaining_days: u32,
    /// Number of path tasks not yet DONE.
    pub pending_tasks: usize,
}

impl CriticalPath {
    fn empty() -> Self {
        Self {
            path: Vec::new(),
            total_days: 0,
            remaining_days: 0,
            pending_tasks: 0,
        }
    }
}

/// A task that blocks two or more other tasks.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bottleneck {
    pub id: String,
    /// Distinct tasks listing this one as a dependency.
    pub blocking_count: usize,
}

/// Compute the critical path over `tasks`.
///
/// Tasks on or downstream of a dependency cycle cannot be ordered and are
/// excluded from the pass; a cycle in a hand-edited tracker degrades the
/// analysis to the acyclic remainder and logs a warning.
pub fn analyze(tasks: &[Task]) -> CriticalPath {
    let graph = DependencyGraph::build(tasks);
    analyze_graph(&graph)
}

fn analyze_graph(graph: &DependencyGraph<'_>) -> CriticalPath {
    let tasks = graph.tasks;
    let n = tasks.len();
    if n == 0 {
        return CriticalPath::empty();
    }

    let mut indegree: Vec<usize> = graph.dependencies.iter().map(Vec::len).collect();
    // Longest cumulative duration of any path ending at the node.
    let mut dist: Vec<u32> = tasks.iter().map(|t| t.estimated_days).collect();
    let mut pred: Vec<Option<usize>> = vec![None; n];
    let mut processed = vec![false; n];

    // Min-heap on node index keeps the traversal in document order, which
    // makes the equal-duration tie-break stable and explicit.
    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| indegree[i] == 0)
        .map(Reverse)
        .collect();

    let mut processed_count = 0;
    while let Some(Reverse(v)) = ready.pop() {
        processed[v] = true;
        processed_count += 1;

        for &w in &graph.dependents[v] {
            let candidate = dist[v] + tasks[w].estimated_days;
            let better = candidate > dist[w]
                || (candidate == dist[w] && pred[w].map_or(true, |p| v < p));
            if better {
                dist[w] = candidate;
                pred[w] = Some(v);
            }
            indegree[w] -= 1;
            if indegree[w] == 0 {
                ready.push(Reverse(w));
            }
        }
    }

    if processed_count < n {
        let cyclic: Vec<&str> = (0..n)
            .filter(|&i| !processed[i])
            .map(|i| tasks[i].id.as_str())
            .collect();
        tracing::warn!(
            tasks = ?cyclic,
            "Dependency cycle in tracker; excluding affected tasks from critical path"
        );
    }

    // Candidate endpoints: processed end nodes; if every end node sits in
    // a cycle, fall back to all processed nodes.
    let mut candidates: Vec<usize> = graph
        .end_nodes()
        .into_iter()
        .filter(|&i| processed[i])
        .collect();
    if candidates.is_empty() {
        candidates = (0..n).filter(|&i| processed[i]).collect();
    }
    let Some(&terminal) = candidates
        .iter()
        .max_by(|&&a, &&b| dist[a].cmp(&dist[b]).then(b.cmp(&a)))
    else {
        return CriticalPath::empty();
    };

    let mut order = Vec::new();
    let mut cursor = Some(terminal);
    while let Some(v) = cursor {
        order.push(v);
        cursor = pred[v];
    }
    order.reverse();

    let total_days = dist[terminal];
    let pending: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&i| tasks[i].status != TaskStatus::Done)
        .collect();
    let remaining_days = pending.iter().map(|&i| tasks[i].estimated_days).sum();

    CriticalPath {
        path: order.iter().map(|&i| tasks[i].id.clone()).collect(),
        total_days,
        remaining_days,
        pending_tasks: pending.len(),
    }
}

/// Rank tasks blocking two or more others, most-blocking first.
/// Ties are broken by ascending id.
pub fn bottlenecks(tasks: &[Task]) -> Vec<Bottleneck> {
    let known: HashMap<&str, ()> = tasks.iter().map(|t| (t.id.as_str(), ())).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for task in tasks {
        let mut deps = task.blockers();
        deps.sort_unstable();
        deps.dedup();
        for dep in deps {
            if known.contains_key(dep) {
                *counts.entry(dep).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<Bottleneck> = counts
        .into_iter()
        .filter(|&(_, count)| count >= 2)
        .map(|(id, blocking_count)| Bottleneck {
            id: id.to_string(),
            blocking_count,
        })
        .collect();
    ranked.sort_by(|a, b| b.blocking_count.cmp(&a.blocking_count).then(a.id.cmp(&b.id)));
    ranked
}
