//! Greedy list scheduling with per-thread serialization.
//!
//! The algorithm is Kahn's ready-elimination expressed as bounded sweeps:
//! each sweep walks the unscheduled set in insertion order and places
//! every node whose dependencies are satisfied, so a sweep that makes no
//! progress proves the remainder is cyclic (or downstream of a cycle).
//! At most one sweep per node can make progress, which bounds the loop
//! without a loop-guard constant.
//!
//! Two deliberate asymmetries, both part of the observable contract:
//!
//! - A dependency that does not resolve to a known node is vacuously
//!   satisfied. The scheduler is permissive; the validator independently
//!   reports the dangling reference.
//! - A node placed early in a sweep unblocks later nodes *within the
//!   same sweep*. This is observable through per-thread serialization
//!   order and is preserved for reproducibility.

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};

use timeloom_core::graph::Graph;
use timeloom_core::identifier::NodeId;
use timeloom_core::schedule::{ScheduledEntry, SchedulePlan};

/// Computes a start/finish slot for every node the dependency structure
/// allows, and returns the rest as the unresolved set.
///
/// Determinism: nodes are considered strictly in graph insertion order —
/// never by id comparison or duration — so equal inputs always produce
/// the same schedule.
pub fn plan(graph: &Graph) -> SchedulePlan {
    let mut thread_available: IndexMap<String, f64> = graph
        .threads()
        .into_iter()
        .map(|thread| (thread.to_string(), 0.0))
        .collect();

    let mut unscheduled: IndexSet<NodeId> = graph.ids().cloned().collect();
    let mut entries: IndexMap<NodeId, ScheduledEntry> = IndexMap::new();

    for sweep in 0..graph.len() {
        let mut progressed = false;

        let pending: Vec<NodeId> = unscheduled.iter().cloned().collect();
        for id in pending {
            let Some(node) = graph.node(&id) else { continue };

            let ready = node
                .depends_on()
                .iter()
                .all(|dep| !graph.contains(dep) || entries.contains_key(dep));
            if !ready {
                continue;
            }

            let dependency_finish = node
                .depends_on()
                .iter()
                .filter_map(|dep| entries.get(dep))
                .map(ScheduledEntry::finish)
                .fold(0.0, f64::max);
            let lane_free = thread_available.get(node.thread()).copied().unwrap_or(0.0);

            let start = dependency_finish.max(lane_free);
            // Mirror the input tolerance: a non-finite duration schedules
            // as instantaneous and is reported by the validator instead.
            let duration = if node.duration().is_finite() {
                node.duration()
            } else {
                0.0
            };

            let entry = ScheduledEntry::new(start, duration, node.thread());
            trace!(id = id.to_string(), start = start, finish = entry.finish(); "Scheduled node");
            thread_available.insert(node.thread().to_string(), entry.finish());
            entries.insert(id.clone(), entry);
            unscheduled.shift_remove(&id);
            progressed = true;
        }

        if unscheduled.is_empty() || !progressed {
            debug!(sweeps = sweep + 1, scheduled = entries.len(); "Scheduling finished");
            break;
        }
    }

    let unresolved: Vec<NodeId> = unscheduled.into_iter().collect();
    if !unresolved.is_empty() {
        warn!(count = unresolved.len(); "Nodes left unscheduled (possible cycle)");
    }
    SchedulePlan::new(entries, unresolved)
}

#[cfg(test)]
mod tests {
    use timeloom_core::graph::Node;

    use super::*;

    fn id(thread: &str, name: &str) -> NodeId {
        NodeId::new(thread, name)
    }

    #[test]
    fn test_serial_chain_on_one_thread() {
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(10.0)).unwrap();
        graph.create("t0", "b", Some(5.0)).unwrap();
        graph.connect(&id("t0", "a"), &id("t0", "b")).unwrap();

        let plan = plan(&graph);
        let a = plan.entry(&id("t0", "a")).unwrap();
        let b = plan.entry(&id("t0", "b")).unwrap();
        assert_eq!((a.start(), a.finish()), (0.0, 10.0));
        assert_eq!((b.start(), b.finish()), (10.0, 15.0));
    }

    #[test]
    fn test_cross_thread_dependency_delays_start() {
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(10.0)).unwrap();
        graph.create("t1", "b", Some(5.0)).unwrap();
        graph.connect(&id("t0", "a"), &id("t1", "b")).unwrap();

        let plan = plan(&graph);
        let b = plan.entry(&id("t1", "b")).unwrap();
        // t1 is free at time 0, but the dependency pins the start.
        assert_eq!(b.start(), 10.0);
        assert_eq!(b.finish(), 15.0);
    }

    #[test]
    fn test_thread_serialization_without_dependencies() {
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(4.0)).unwrap();
        graph.create("t0", "b", Some(3.0)).unwrap();

        let plan = plan(&graph);
        let a = plan.entry(&id("t0", "a")).unwrap();
        let b = plan.entry(&id("t0", "b")).unwrap();
        // Insertion order breaks the tie; the lane serializes.
        assert_eq!((a.start(), a.finish()), (0.0, 4.0));
        assert_eq!((b.start(), b.finish()), (4.0, 7.0));
    }

    #[test]
    fn test_cycle_members_are_unresolved() {
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(1.0)).unwrap();
        graph.create("t0", "b", Some(1.0)).unwrap();
        graph.create("t0", "c", Some(1.0)).unwrap();
        graph.connect(&id("t0", "a"), &id("t0", "b")).unwrap();
        graph.connect(&id("t0", "b"), &id("t0", "c")).unwrap();
        graph.connect(&id("t0", "c"), &id("t0", "a")).unwrap();

        let plan = plan(&graph);
        assert_eq!(plan.scheduled_count(), 0);
        assert_eq!(
            plan.unresolved(),
            &[id("t0", "a"), id("t0", "b"), id("t0", "c")]
        );
    }

    #[test]
    fn test_downstream_of_cycle_is_also_unresolved() {
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(1.0)).unwrap();
        graph.create("t0", "b", Some(1.0)).unwrap();
        graph.create("t1", "tail", Some(1.0)).unwrap();
        graph.connect(&id("t0", "a"), &id("t0", "b")).unwrap();
        graph.connect(&id("t0", "b"), &id("t0", "a")).unwrap();
        graph.connect(&id("t0", "b"), &id("t1", "tail")).unwrap();

        let plan = plan(&graph);
        assert!(plan.unresolved().contains(&id("t1", "tail")));
    }

    #[test]
    fn test_dangling_dependency_does_not_block() {
        let mut graph = Graph::new();
        let mut node = Node::new(id("t0", "a"), Some(2.0));
        node.record_dependency(id("ghost", "missing"));
        graph.insert(node).unwrap();

        let plan = plan(&graph);
        let a = plan.entry(&id("t0", "a")).unwrap();
        assert_eq!((a.start(), a.finish()), (0.0, 2.0));
    }

    #[test]
    fn test_in_sweep_progress_unblocks_later_nodes() {
        // b depends on a and both precede c in insertion order; a single
        // sweep schedules all three, so b claims the lane before c.
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(1.0)).unwrap();
        graph.create("t0", "b", Some(1.0)).unwrap();
        graph.create("t0", "c", Some(1.0)).unwrap();
        graph.connect(&id("t0", "a"), &id("t0", "b")).unwrap();

        let plan = plan(&graph);
        let b = plan.entry(&id("t0", "b")).unwrap();
        let c = plan.entry(&id("t0", "c")).unwrap();
        assert_eq!((b.start(), b.finish()), (1.0, 2.0));
        assert_eq!((c.start(), c.finish()), (2.0, 3.0));
    }

    #[test]
    fn test_zero_duration_nodes_take_no_lane_time() {
        let mut graph = Graph::new();
        graph.create("t0", "mark", None).unwrap();
        graph.create("t0", "work", Some(6.0)).unwrap();

        let plan = plan(&graph);
        let mark = plan.entry(&id("t0", "mark")).unwrap();
        let work = plan.entry(&id("t0", "work")).unwrap();
        assert_eq!((mark.start(), mark.finish()), (0.0, 0.0));
        assert_eq!((work.start(), work.finish()), (0.0, 6.0));
    }
}
