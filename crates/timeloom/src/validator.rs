//! Structural consistency checks over a built graph.
//!
//! Five independent checks, each contributing zero or more diagnostics;
//! all of them always run, so one broken aspect never hides another. The
//! graph is never mutated — a violation is reported, not repaired,
//! because hand-edited input files are precisely where violations come
//! from.
//!
//! The last check delegates to the scheduler, and its result is kept in
//! the returned [`Validation`] so callers never schedule twice.

use indexmap::{IndexMap, IndexSet};
use log::debug;

use timeloom_core::diagnostic::{Category, Diagnostic};
use timeloom_core::graph::{Graph, Node};
use timeloom_core::identifier::NodeId;
use timeloom_core::schedule::SchedulePlan;

use crate::scheduler;

/// The combined result of validating a graph.
#[derive(Debug)]
pub struct Validation {
    diagnostics: Vec<Diagnostic>,
    plan: SchedulePlan,
}

impl Validation {
    /// All findings, in check order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The schedule computed as part of validation.
    pub fn plan(&self) -> &SchedulePlan {
        &self.plan
    }

    /// Consumes the validation, yielding its parts.
    pub fn into_parts(self) -> (Vec<Diagnostic>, SchedulePlan) {
        (self.diagnostics, self.plan)
    }
}

/// Runs every check against the graph.
pub fn validate(graph: &Graph) -> Validation {
    let mut diagnostics = Vec::new();

    check_durations(graph, &mut diagnostics);
    check_entry_points(graph, &mut diagnostics);
    check_edge_consistency(graph, &mut diagnostics);
    check_lane_ordering(graph, &mut diagnostics);

    let plan = scheduler::plan(graph);
    check_unresolved(&plan, &mut diagnostics);

    debug!(findings = diagnostics.len(); "Validation finished");
    Validation { diagnostics, plan }
}

/// An explicitly provided duration must be a finite number greater than
/// zero; the defaulted zero of an absent duration is fine.
fn check_durations(graph: &Graph, diagnostics: &mut Vec<Diagnostic>) {
    for node in graph.nodes() {
        if node.duration_provided() && !(node.duration().is_finite() && node.duration() > 0.0) {
            diagnostics.push(Diagnostic::warning(
                Category::InvalidDuration,
                format!(
                    "node `{id}` has an invalid duration ({duration})",
                    id = node.id(),
                    duration = node.duration()
                ),
            ));
        }
    }
}

/// Each thread should have at most one entry node; more than one leaves
/// the lane without a defined starting point.
fn check_entry_points(graph: &Graph, diagnostics: &mut Vec<Diagnostic>) {
    let mut entries_by_thread: IndexMap<&str, Vec<&NodeId>> = IndexMap::new();
    for node in graph.nodes() {
        if node.is_entry() {
            entries_by_thread
                .entry(node.thread())
                .or_default()
                .push(node.id());
        }
    }

    for (thread, entries) in entries_by_thread {
        if entries.len() > 1 {
            diagnostics.push(Diagnostic::warning(
                Category::DuplicateEntryPoint,
                format!(
                    "thread `{thread}` has multiple entry modules: {list}",
                    list = join_ids(entries.iter().copied())
                ),
            ));
        }
    }
}

/// Both edge directions are scanned independently, so an edit that only
/// half-updated the relation is always caught: an unknown target is a
/// dangling reference, a known target without the reverse entry is an
/// asymmetry.
fn check_edge_consistency(graph: &Graph, diagnostics: &mut Vec<Diagnostic>) {
    for node in graph.nodes() {
        for dependent in node.dependents() {
            match graph.node(dependent) {
                None => diagnostics.push(Diagnostic::warning(
                    Category::DanglingReference,
                    format!(
                        "node `{id}` lists unknown node `{dependent}` as a dependent",
                        id = node.id()
                    ),
                )),
                Some(other) if !other.depends_on().contains(node.id()) => {
                    diagnostics.push(Diagnostic::warning(
                        Category::EdgeAsymmetry,
                        format!(
                            "node `{id}` lists `{dependent}` as a dependent, but `{dependent}` does not list `{id}` as a dependency",
                            id = node.id()
                        ),
                    ));
                }
                Some(_) => {}
            }
        }
    }

    for node in graph.nodes() {
        for dependency in node.depends_on() {
            match graph.node(dependency) {
                None => diagnostics.push(Diagnostic::warning(
                    Category::DanglingReference,
                    format!(
                        "node `{id}` lists unknown node `{dependency}` as a dependency",
                        id = node.id()
                    ),
                )),
                Some(other) if !other.dependents().contains(node.id()) => {
                    diagnostics.push(Diagnostic::warning(
                        Category::EdgeAsymmetry,
                        format!(
                            "node `{id}` lists `{dependency}` as a dependency, but `{dependency}` does not list `{id}` as a dependent",
                            id = node.id()
                        ),
                    ));
                }
                Some(_) => {}
            }
        }
    }
}

/// Two nodes on the same thread must be ordered by some dependency path,
/// or the renderer has no principled way to place one before the other.
fn check_lane_ordering(graph: &Graph, diagnostics: &mut Vec<Diagnostic>) {
    let reachable = forward_reachability(graph);

    let mut by_thread: IndexMap<&str, Vec<&NodeId>> = IndexMap::new();
    for node in graph.nodes() {
        by_thread.entry(node.thread()).or_default().push(node.id());
    }

    for (thread, ids) in by_thread {
        for (index, a) in ids.iter().enumerate() {
            for b in &ids[index + 1..] {
                let a_reaches_b = reachable[*a].contains(*b);
                let b_reaches_a = reachable[*b].contains(*a);
                if !a_reaches_b && !b_reaches_a {
                    diagnostics.push(Diagnostic::warning(
                        Category::AmbiguousOrdering,
                        format!(
                            "thread `{thread}`: execution order of `{a}` and `{b}` is ambiguous"
                        ),
                    ));
                }
            }
        }
    }
}

/// Every node the scheduler could not place, reported once as a group.
fn check_unresolved(plan: &SchedulePlan, diagnostics: &mut Vec<Diagnostic>) {
    if !plan.unresolved().is_empty() {
        diagnostics.push(Diagnostic::warning(
            Category::UnresolvedDependency,
            format!(
                "circular dependency between modules: {list}",
                list = join_ids(plan.unresolved().iter())
            ),
        ));
    }
}

/// Forward-reachable set of every node via `dependents` edges.
///
/// Iterative depth-first traversal; the seen-set makes it safe on cyclic
/// graphs.
fn forward_reachability(graph: &Graph) -> IndexMap<&NodeId, IndexSet<&NodeId>> {
    graph
        .nodes()
        .map(|node| (node.id(), reach_from(graph, node)))
        .collect()
}

fn reach_from<'graph>(graph: &'graph Graph, node: &Node) -> IndexSet<&'graph NodeId> {
    let mut seen: IndexSet<&NodeId> = IndexSet::new();
    let mut stack: Vec<&NodeId> = node
        .dependents()
        .iter()
        .filter_map(|id| graph.node(id))
        .map(Node::id)
        .collect();

    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        if let Some(next) = graph.node(current) {
            for dependent in next.dependents() {
                if let Some(resolved) = graph.node(dependent)
                    && !seen.contains(resolved.id())
                {
                    stack.push(resolved.id());
                }
            }
        }
    }
    seen
}

fn join_ids<'id>(ids: impl Iterator<Item = &'id NodeId>) -> String {
    ids.map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use timeloom_core::diagnostic::Severity;
    use timeloom_core::graph::Node;

    use super::*;

    fn id(thread: &str, name: &str) -> NodeId {
        NodeId::new(thread, name)
    }

    fn categories(validation: &Validation) -> Vec<Category> {
        validation
            .diagnostics()
            .iter()
            .map(Diagnostic::category)
            .collect()
    }

    #[test]
    fn test_clean_graph_yields_no_diagnostics() {
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(10.0)).unwrap();
        graph.create("t0", "b", Some(5.0)).unwrap();
        graph.connect(&id("t0", "a"), &id("t0", "b")).unwrap();

        let validation = validate(&graph);
        assert!(validation.diagnostics().is_empty());
        assert!(validation.plan().is_fully_scheduled());
    }

    #[test]
    fn test_invalid_durations_reported() {
        let mut graph = Graph::new();
        graph.create("t0", "zero", Some(0.0)).unwrap();
        graph.create("t0", "negative", Some(-3.0)).unwrap();
        graph.create("t1", "defaulted", None).unwrap();
        graph
            .connect(&id("t0", "zero"), &id("t0", "negative"))
            .unwrap();

        let validation = validate(&graph);
        let findings: Vec<&Diagnostic> = validation
            .diagnostics()
            .iter()
            .filter(|d| d.category() == Category::InvalidDuration)
            .collect();
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message().contains("t0:zero"));
        assert!(findings[1].message().contains("-3"));
        // The defaulted zero is not a finding.
        assert!(!findings.iter().any(|d| d.message().contains("defaulted")));
    }

    #[test]
    fn test_duplicate_entry_points_reported_per_thread() {
        let mut graph = Graph::new();
        graph.create("T1", "a", Some(1.0)).unwrap();
        graph.create("T1", "b", Some(1.0)).unwrap();

        let validation = validate(&graph);
        let finding = validation
            .diagnostics()
            .iter()
            .find(|d| d.category() == Category::DuplicateEntryPoint)
            .expect("should report duplicate entries");
        assert!(finding.message().contains("T1:a"));
        assert!(finding.message().contains("T1:b"));
    }

    #[test]
    fn test_half_recorded_edge_yields_exactly_one_asymmetry() {
        let mut graph = Graph::new();
        let mut a = Node::new(id("t0", "a"), Some(1.0));
        a.record_dependent(id("t0", "b"));
        graph.insert(a).unwrap();
        graph.create("t0", "b", Some(1.0)).unwrap();

        let validation = validate(&graph);
        let findings: Vec<&Diagnostic> = validation
            .diagnostics()
            .iter()
            .filter(|d| d.category() == Category::EdgeAsymmetry)
            .collect();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message().contains("t0:a"));
        assert!(findings[0].message().contains("t0:b"));
    }

    #[test]
    fn test_dangling_reference_reported_not_asymmetry() {
        let mut graph = Graph::new();
        let mut a = Node::new(id("t0", "a"), Some(1.0));
        a.record_dependency(id("t9", "ghost"));
        graph.insert(a).unwrap();

        let validation = validate(&graph);
        let cats = categories(&validation);
        assert!(cats.contains(&Category::DanglingReference));
        assert!(!cats.contains(&Category::EdgeAsymmetry));
    }

    #[test]
    fn test_unordered_same_thread_pair_is_ambiguous() {
        let mut graph = Graph::new();
        graph.create("T1", "left", Some(1.0)).unwrap();
        graph.create("T1", "right", Some(1.0)).unwrap();
        graph.create("T0", "root", Some(1.0)).unwrap();
        graph.connect(&id("T0", "root"), &id("T1", "left")).unwrap();
        graph
            .connect(&id("T0", "root"), &id("T1", "right"))
            .unwrap();

        let validation = validate(&graph);
        let finding = validation
            .diagnostics()
            .iter()
            .find(|d| d.category() == Category::AmbiguousOrdering)
            .expect("should report the unordered pair");
        assert!(finding.message().contains("T1:left"));
        assert!(finding.message().contains("T1:right"));
    }

    #[test]
    fn test_ordered_same_thread_pair_is_not_ambiguous() {
        let mut graph = Graph::new();
        graph.create("T1", "first", Some(1.0)).unwrap();
        graph.create("T1", "second", Some(1.0)).unwrap();
        graph
            .connect(&id("T1", "first"), &id("T1", "second"))
            .unwrap();

        let validation = validate(&graph);
        assert!(!categories(&validation).contains(&Category::AmbiguousOrdering));
    }

    #[test]
    fn test_cycle_yields_single_unresolved_diagnostic() {
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(1.0)).unwrap();
        graph.create("t0", "b", Some(1.0)).unwrap();
        graph.create("t0", "c", Some(1.0)).unwrap();
        graph.connect(&id("t0", "a"), &id("t0", "b")).unwrap();
        graph.connect(&id("t0", "b"), &id("t0", "c")).unwrap();
        graph.connect(&id("t0", "c"), &id("t0", "a")).unwrap();

        let validation = validate(&graph);
        let findings: Vec<&Diagnostic> = validation
            .diagnostics()
            .iter()
            .filter(|d| d.category() == Category::UnresolvedDependency)
            .collect();
        assert_eq!(findings.len(), 1);
        for name in ["t0:a", "t0:b", "t0:c"] {
            assert!(findings[0].message().contains(name));
        }
        assert_eq!(validation.plan().scheduled_count(), 0);
    }

    #[test]
    fn test_all_checks_run_despite_earlier_findings() {
        // Bad duration and a cycle at the same time: both reported.
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(-1.0)).unwrap();
        graph.create("t0", "b", Some(1.0)).unwrap();
        graph.connect(&id("t0", "a"), &id("t0", "b")).unwrap();
        graph.connect(&id("t0", "b"), &id("t0", "a")).unwrap();

        let cats = categories(&validate(&graph));
        assert!(cats.contains(&Category::InvalidDuration));
        assert!(cats.contains(&Category::UnresolvedDependency));
    }

    #[test]
    fn test_validation_findings_are_warnings() {
        let mut graph = Graph::new();
        graph.create("t0", "a", Some(0.0)).unwrap();

        let validation = validate(&graph);
        assert!(
            validation
                .diagnostics()
                .iter()
                .all(|d| d.severity() == Severity::Warning)
        );
    }
}
