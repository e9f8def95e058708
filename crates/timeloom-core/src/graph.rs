//! The graph model: nodes, dependency edges, and the mutations that keep
//! them consistent.
//!
//! Dependency edges are stored twice, once on each endpoint (`depends_on`
//! on the waiting node, `dependents` on the awaited one). Graphs built
//! purely through the paired operations [`Graph::connect`] and
//! [`Graph::disconnect`] keep the two views symmetric by construction.
//! Importers may record edges one-sidedly on a [`Node`] before it is
//! inserted ([`Node::record_dependency`] / [`Node::record_dependent`]),
//! because hand-edited input files can genuinely be asymmetric and the
//! validator must be able to see that.
//!
//! All collections iterate in insertion order. The scheduler's
//! determinism contract depends on this, which is why removal always
//! shifts rather than swaps.

use indexmap::{IndexMap, IndexSet};
use log::debug;
use thiserror::Error;

use crate::identifier::NodeId;

/// Errors produced by graph mutations.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node `{0}` already exists")]
    DuplicateNode(NodeId),

    #[error("node `{0}` does not exist")]
    UnknownNode(NodeId),

    #[error("node `{0}` cannot depend on itself")]
    SelfReference(NodeId),
}

/// A single unit of work.
///
/// The duration is always present; `duration_provided` records whether it
/// was explicitly given or defaulted to zero, so the validator can tell a
/// deliberate zero-length node apart from a missing value.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    duration: f64,
    duration_provided: bool,
    depends_on: IndexSet<NodeId>,
    dependents: IndexSet<NodeId>,
}

impl Node {
    /// Creates a node with an optional explicit duration.
    pub fn new(id: NodeId, duration: Option<f64>) -> Self {
        let (duration, duration_provided) = match duration {
            Some(value) => (value, true),
            None => (0.0, false),
        };
        Self {
            id,
            duration,
            duration_provided,
            depends_on: IndexSet::new(),
            dependents: IndexSet::new(),
        }
    }

    /// The composite `thread:module` identity of this node.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The thread (lane) this node runs on.
    pub fn thread(&self) -> &str {
        self.id.thread()
    }

    /// The short display name of this node.
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// Duration in abstract time units; zero when none was provided.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Whether the duration was explicitly given in the input.
    pub fn duration_provided(&self) -> bool {
        self.duration_provided
    }

    /// Nodes this one must wait for.
    pub fn depends_on(&self) -> &IndexSet<NodeId> {
        &self.depends_on
    }

    /// Nodes that wait for this one.
    pub fn dependents(&self) -> &IndexSet<NodeId> {
        &self.dependents
    }

    /// Whether this node has no incoming dependency (an entry node).
    pub fn is_entry(&self) -> bool {
        self.depends_on.is_empty()
    }

    /// Records a dependency on this node only, without a reverse edge.
    ///
    /// This is the import path: input files record `from`/`to` lists
    /// independently, and an inconsistency between them must survive into
    /// the model so the validator can report it. Once a node is inside a
    /// [`Graph`], edges change only through the paired operations
    /// [`Graph::connect`] / [`Graph::disconnect`].
    pub fn record_dependency(&mut self, dependency: NodeId) {
        self.depends_on.insert(dependency);
    }

    /// Records a dependent on this node only, without a reverse edge.
    /// See [`Node::record_dependency`].
    pub fn record_dependent(&mut self, dependent: NodeId) {
        self.dependents.insert(dependent);
    }
}

/// The node/edge data structure; exclusive owner of all nodes.
///
/// No other component mutates diagram state directly — every edit goes
/// through the operations below, and derived data (schedule, layout) is
/// recomputed from scratch afterwards.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully constructed node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if the id is already taken.
    pub fn insert(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(node.id()) {
            return Err(GraphError::DuplicateNode(node.id().clone()));
        }
        self.nodes.insert(node.id().clone(), node);
        Ok(())
    }

    /// Creates and inserts a node, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if the id is already taken.
    pub fn create(
        &mut self,
        thread: &str,
        name: &str,
        duration: Option<f64>,
    ) -> Result<NodeId, GraphError> {
        let id = NodeId::new(thread, name);
        self.insert(Node::new(id.clone(), duration))?;
        Ok(id)
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node ids, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Thread names in order of first appearance.
    pub fn threads(&self) -> IndexSet<&str> {
        self.nodes.values().map(Node::thread).collect()
    }

    /// Records the dependency edge `target` waits for `source`, updating
    /// both endpoints atomically.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if either endpoint is missing,
    /// or [`GraphError::SelfReference`] when `source == target`.
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Result<(), GraphError> {
        if source == target {
            return Err(GraphError::SelfReference(source.clone()));
        }
        self.require(source)?;
        self.require(target)?;

        self.nodes[source].dependents.insert(target.clone());
        self.nodes[target].depends_on.insert(source.clone());
        debug!(source = source.to_string(), target = target.to_string(); "Connected nodes");
        Ok(())
    }

    /// Removes the dependency edge `target` waits for `source` from both
    /// endpoints. Removing an edge that does not exist is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if either endpoint is missing.
    pub fn disconnect(&mut self, source: &NodeId, target: &NodeId) -> Result<(), GraphError> {
        self.require(source)?;
        self.require(target)?;

        self.nodes[source].dependents.shift_remove(target);
        self.nodes[target].depends_on.shift_remove(source);
        Ok(())
    }

    /// Deletes a node and scrubs every reference to it from the edge sets
    /// of the remaining nodes, in both directions.
    ///
    /// The sweep covers all nodes rather than just the recorded
    /// neighbours, so asymmetric references to the removed node die too.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if the node is missing.
    pub fn remove(&mut self, id: &NodeId) -> Result<Node, GraphError> {
        let node = self
            .nodes
            .shift_remove(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;

        for other in self.nodes.values_mut() {
            other.depends_on.shift_remove(id);
            other.dependents.shift_remove(id);
        }
        debug!(id = id.to_string(); "Removed node");
        Ok(node)
    }

    /// Renames a node, rewriting every reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if the node is missing, or
    /// [`GraphError::DuplicateNode`] if the new id is already taken.
    pub fn rename(&mut self, id: &NodeId, new_name: &str) -> Result<NodeId, GraphError> {
        let new_id = id.with_name(new_name);
        self.reidentify(id, new_id)
    }

    /// Moves a node to another thread, rewriting every reference to it.
    ///
    /// The composite id changes because thread is part of identity.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if the node is missing, or
    /// [`GraphError::DuplicateNode`] if the new id is already taken.
    pub fn move_to_thread(&mut self, id: &NodeId, thread: &str) -> Result<NodeId, GraphError> {
        let new_id = id.with_thread(thread);
        self.reidentify(id, new_id)
    }

    fn require(&self, id: &NodeId) -> Result<(), GraphError> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id.clone()))
        }
    }

    /// Replaces `old` with `new` as a key and inside every edge set,
    /// preserving insertion order throughout.
    fn reidentify(&mut self, old: &NodeId, new: NodeId) -> Result<NodeId, GraphError> {
        if new == *old {
            return Ok(new);
        }
        self.require(old)?;
        if self.nodes.contains_key(&new) {
            return Err(GraphError::DuplicateNode(new));
        }

        let rewrite = |set: &IndexSet<NodeId>| -> IndexSet<NodeId> {
            set.iter()
                .map(|id| if id == old { new.clone() } else { id.clone() })
                .collect()
        };

        self.nodes = self
            .nodes
            .iter()
            .map(|(key, node)| {
                let mut node = node.clone();
                node.depends_on = rewrite(&node.depends_on);
                node.dependents = rewrite(&node.dependents);
                if key == old {
                    node.id = new.clone();
                    (new.clone(), node)
                } else {
                    (key.clone(), node)
                }
            })
            .collect();

        debug!(old = old.to_string(), new = new.to_string(); "Reidentified node");
        Ok(new)
    }
}
