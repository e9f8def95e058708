//! Serializes a graph back into the per-thread interchange schema.
//!
//! Only graph structure round-trips: node names, threads, explicit
//! durations, and both edge lists. Geometry is derived data and is
//! deliberately excluded. Feeding the output back through
//! [`timeloom_parser::build_records`] reproduces the original graph.

use indexmap::IndexMap;
use log::debug;

use timeloom_core::graph::Graph;
use timeloom_parser::schema::{RawEntry, RawRef, RawTime};

use crate::error::TimeloomError;

/// Converts the graph into one entry list per thread, in lane and node
/// insertion order.
pub fn to_records(graph: &Graph) -> IndexMap<String, Vec<RawEntry>> {
    let mut records: IndexMap<String, Vec<RawEntry>> = graph
        .threads()
        .into_iter()
        .map(|thread| (thread.to_string(), Vec::new()))
        .collect();

    for node in graph.nodes() {
        // Every reference is emitted fully qualified; the importer's
        // thread-defaulting is a convenience for hand-written files.
        let from = node
            .depends_on()
            .iter()
            .map(|id| RawRef::qualified(id.thread(), id.name()))
            .collect();
        let to = node
            .dependents()
            .iter()
            .map(|id| RawRef::qualified(id.thread(), id.name()))
            .collect();

        // A provided non-finite duration has no JSON representation; it
        // degrades to an absent value on the way out.
        let time = (node.duration_provided() && node.duration().is_finite())
            .then(|| RawTime::Number(node.duration()));

        let entry = RawEntry {
            module: node.name().to_string(),
            time,
            from,
            to,
        };
        records
            .entry(node.thread().to_string())
            .or_default()
            .push(entry);
    }

    debug!(threads = records.len(); "Graph exported to schema records");
    records
}

/// Serializes the graph to pretty-printed interchange JSON, keyed by
/// thread.
///
/// # Errors
///
/// Returns [`TimeloomError::Export`] if serialization fails.
pub fn to_json(graph: &Graph) -> Result<String, TimeloomError> {
    let records = to_records(graph);
    Ok(serde_json::to_string_pretty(&records)?)
}

#[cfg(test)]
mod tests {
    use indexmap::IndexSet;

    use timeloom_core::identifier::NodeId;
    use timeloom_parser::build_records;

    use super::*;

    fn id(thread: &str, name: &str) -> NodeId {
        NodeId::new(thread, name)
    }

    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(10.0)).unwrap();
        graph.create("t0", "b", Some(5.0)).unwrap();
        graph.create("t1", "c", None).unwrap();
        graph.connect(&id("t0", "a"), &id("t0", "b")).unwrap();
        graph.connect(&id("t0", "a"), &id("t1", "c")).unwrap();
        graph
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let original = sample_graph();
        let outcome = build_records(&to_records(&original));
        assert!(outcome.parse_errors().is_empty());
        let rebuilt = outcome.graph();

        let original_ids: IndexSet<&NodeId> = original.ids().collect();
        let rebuilt_ids: IndexSet<&NodeId> = rebuilt.ids().collect();
        assert_eq!(original_ids, rebuilt_ids);

        for node in original.nodes() {
            let twin = rebuilt.node(node.id()).expect("node should round-trip");
            assert_eq!(twin.thread(), node.thread());
            assert_eq!(twin.duration(), node.duration());
            assert_eq!(twin.duration_provided(), node.duration_provided());
            assert_eq!(twin.depends_on(), node.depends_on());
            assert_eq!(twin.dependents(), node.dependents());
        }
    }

    #[test]
    fn test_defaulted_duration_is_not_emitted() {
        let records = to_records(&sample_graph());
        let c = &records["t1"][0];
        assert_eq!(c.module, "c");
        assert!(c.time.is_none());
    }

    #[test]
    fn test_json_has_one_array_per_thread() {
        let json = to_json(&sample_graph()).expect("should serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("should parse");
        let map = value.as_object().expect("should be an object");
        assert_eq!(map.len(), 2);
        assert!(map["t0"].as_array().is_some_and(|a| a.len() == 2));
    }
}
