//! Computed start/finish assignments.
//!
//! A [`SchedulePlan`] is derived data: it is recomputed in full whenever
//! the graph changes and never patched incrementally, so it can never go
//! stale relative to the model.

use indexmap::IndexMap;

use crate::identifier::NodeId;

/// The computed time slot of a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEntry {
    start: f64,
    finish: f64,
    thread: String,
    duration: f64,
}

impl ScheduledEntry {
    /// Creates an entry; `finish` is always `start + duration`.
    pub fn new(start: f64, duration: f64, thread: impl Into<String>) -> Self {
        Self {
            start,
            finish: start + duration,
            thread: thread.into(),
            duration,
        }
    }

    /// Earliest time the node can begin.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Time the node completes: `start + duration`.
    pub fn finish(&self) -> f64 {
        self.finish
    }

    /// The thread this entry serializes on.
    pub fn thread(&self) -> &str {
        &self.thread
    }

    /// Effective duration used for scheduling.
    pub fn duration(&self) -> f64 {
        self.duration
    }
}

/// The full result of a scheduling run.
///
/// Entries keep the order in which nodes were scheduled; the unresolved
/// list keeps graph insertion order.
#[derive(Debug, Clone, Default)]
pub struct SchedulePlan {
    entries: IndexMap<NodeId, ScheduledEntry>,
    unresolved: Vec<NodeId>,
}

impl SchedulePlan {
    /// Creates a plan from scheduled entries and the ids left unplaced.
    pub fn new(entries: IndexMap<NodeId, ScheduledEntry>, unresolved: Vec<NodeId>) -> Self {
        Self {
            entries,
            unresolved,
        }
    }

    /// The slot computed for a node, if it was scheduled.
    pub fn entry(&self, id: &NodeId) -> Option<&ScheduledEntry> {
        self.entries.get(id)
    }

    /// All scheduled entries, in scheduling order.
    pub fn entries(&self) -> impl Iterator<Item = (&NodeId, &ScheduledEntry)> {
        self.entries.iter()
    }

    /// Number of scheduled nodes.
    pub fn scheduled_count(&self) -> usize {
        self.entries.len()
    }

    /// Nodes that could not be placed: members of a cycle, or nodes that
    /// transitively depend on one.
    pub fn unresolved(&self) -> &[NodeId] {
        &self.unresolved
    }

    /// Whether every node received a slot.
    pub fn is_fully_scheduled(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Latest finish time across all scheduled nodes; zero when empty.
    pub fn total_duration(&self) -> f64 {
        self.entries
            .values()
            .map(ScheduledEntry::finish)
            .fold(0.0, f64::max)
    }
}
