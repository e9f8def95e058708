//! Assembles per-thread records into a single dependency graph.

use indexmap::IndexMap;
use log::{debug, warn};

use timeloom_core::diagnostic::{Category, Diagnostic};
use timeloom_core::graph::{Graph, Node};
use timeloom_core::identifier::NodeId;

use crate::schema::{RawEntry, RawPayload};

/// The result of building a graph from raw input.
///
/// Parse failures never abort the build: a file that cannot be read as
/// the expected structure is skipped with one diagnostic, and every
/// remaining file still contributes its thread.
#[derive(Debug)]
pub struct BuildOutcome {
    graph: Graph,
    parse_errors: Vec<Diagnostic>,
}

impl BuildOutcome {
    /// The assembled graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Per-file parse diagnostics, in input order.
    pub fn parse_errors(&self) -> &[Diagnostic] {
        &self.parse_errors
    }

    /// Consumes the outcome, yielding its parts.
    pub fn into_parts(self) -> (Graph, Vec<Diagnostic>) {
        (self.graph, self.parse_errors)
    }
}

/// Builds a graph from raw thread files.
///
/// Keys are file names (a final extension is stripped to obtain the
/// thread identifier); values are the file contents, each a JSON payload
/// of entry records.
pub fn build_graph(files: &IndexMap<String, String>) -> BuildOutcome {
    let mut records: IndexMap<String, Vec<RawEntry>> = IndexMap::new();
    let mut parse_errors = Vec::new();

    for (file_name, content) in files {
        let thread = thread_name(file_name);
        match serde_json::from_str::<RawPayload>(content.trim()) {
            Ok(payload) => {
                let entries = payload.into_entries();
                debug!(file = file_name.as_str(), entries = entries.len(); "Parsed thread file");
                records.entry(thread.to_string()).or_default().extend(entries);
            }
            Err(err) => {
                warn!(file = file_name.as_str(); "Skipping unparsable thread file");
                parse_errors.push(Diagnostic::error(
                    Category::Parse,
                    format!("file `{file_name}`: invalid JSON ({err})"),
                ));
            }
        }
    }

    let mut outcome = build_records(&records);
    // File-level failures come first, before any structural findings.
    parse_errors.extend(outcome.parse_errors);
    outcome.parse_errors = parse_errors;
    outcome
}

/// Builds a graph from already-parsed records, one entry list per thread.
///
/// This is also the import half of the schema round-trip: feeding the
/// exporter's output back through here reproduces the original graph.
pub fn build_records(records: &IndexMap<String, Vec<RawEntry>>) -> BuildOutcome {
    let mut graph = Graph::new();
    let mut parse_errors = Vec::new();

    for (thread, entries) in records {
        for entry in entries {
            let id = NodeId::new(thread.as_str(), entry.module.as_str());
            if graph.contains(&id) {
                parse_errors.push(Diagnostic::warning(
                    Category::Parse,
                    format!(
                        "thread `{thread}`: duplicate module `{module}` ignored",
                        module = entry.module
                    ),
                ));
                continue;
            }

            let mut node = Node::new(id, entry.time.as_ref().and_then(|t| t.value()));
            // References are recorded exactly as the file gave them, one
            // side at a time; the validator owns symmetry checking.
            for reference in &entry.from {
                if let Some(dependency) = reference.resolve(thread) {
                    node.record_dependency(dependency);
                }
            }
            for reference in &entry.to {
                if let Some(dependent) = reference.resolve(thread) {
                    node.record_dependent(dependent);
                }
            }

            // The id was checked just above; insertion cannot collide.
            let _ = graph.insert(node);
        }
    }

    debug!(nodes = graph.len(), threads = graph.threads().len(); "Graph built");
    BuildOutcome {
        graph,
        parse_errors,
    }
}

fn thread_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((base, _extension)) if !base.is_empty() => base,
        _ => file_name,
    }
}
