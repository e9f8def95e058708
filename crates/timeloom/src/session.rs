//! Interactive edit sessions with snapshot undo/redo.
//!
//! Every user-visible edit is an atomic transaction: the current graph
//! is snapshotted, the mutation applied, and derived data (validation,
//! schedule, layout) recomputed afterwards by the caller. A mutation
//! that fails restores the pre-edit graph, so no partial state is ever
//! observable.
//!
//! History is two bounded LIFO stacks of full-graph snapshots. Cloning
//! the whole graph per edit is deliberate: at human-edited scale it is
//! instantaneous, and it cannot get an inverse-operation log subtly
//! wrong. Any new edit invalidates the redo stack.

use std::collections::VecDeque;

use log::debug;

use timeloom_core::graph::{Graph, GraphError};
use timeloom_core::identifier::NodeId;

/// Default bound for each history stack.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// A single-owner editing session over one graph.
#[derive(Debug)]
pub struct Session {
    graph: Graph,
    undo: VecDeque<Graph>,
    redo: Vec<Graph>,
    capacity: usize,
}

impl Session {
    /// Starts a session owning `graph`, with the default history bound.
    pub fn new(graph: Graph) -> Self {
        Self::with_capacity(graph, DEFAULT_HISTORY_CAPACITY)
    }

    /// Starts a session with an explicit history bound.
    pub fn with_capacity(graph: Graph, capacity: usize) -> Self {
        Self {
            graph,
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity,
        }
    }

    /// The current graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Creates a node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if the id is taken.
    pub fn create_node(
        &mut self,
        thread: &str,
        name: &str,
        duration: Option<f64>,
    ) -> Result<NodeId, GraphError> {
        self.transact(|graph| graph.create(thread, name, duration))
    }

    /// Deletes a node and every edge touching it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if the node is missing.
    pub fn delete_node(&mut self, id: &NodeId) -> Result<(), GraphError> {
        self.transact(|graph| graph.remove(id).map(|_| ()))
    }

    /// Connects `target` to depend on `source`.
    ///
    /// # Errors
    ///
    /// Propagates the underlying [`GraphError`].
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Result<(), GraphError> {
        self.transact(|graph| graph.connect(source, target))
    }

    /// Removes the dependency of `target` on `source`.
    ///
    /// # Errors
    ///
    /// Propagates the underlying [`GraphError`].
    pub fn disconnect(&mut self, source: &NodeId, target: &NodeId) -> Result<(), GraphError> {
        self.transact(|graph| graph.disconnect(source, target))
    }

    /// Renames a node, returning its new id.
    ///
    /// # Errors
    ///
    /// Propagates the underlying [`GraphError`].
    pub fn rename(&mut self, id: &NodeId, new_name: &str) -> Result<NodeId, GraphError> {
        self.transact(|graph| graph.rename(id, new_name))
    }

    /// Moves a node to another thread, returning its new id.
    ///
    /// # Errors
    ///
    /// Propagates the underlying [`GraphError`].
    pub fn move_to_thread(&mut self, id: &NodeId, thread: &str) -> Result<NodeId, GraphError> {
        self.transact(|graph| graph.move_to_thread(id, thread))
    }

    /// Restores the most recent snapshot. Returns `false` when the undo
    /// stack is empty.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.graph, snapshot);
        self.redo.push(current);
        debug!(depth = self.undo.len(); "Undo applied");
        true
    }

    /// Re-applies the most recently undone edit. Returns `false` when
    /// the redo stack is empty.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.graph, snapshot);
        self.push_undo(current);
        debug!(depth = self.redo.len(); "Redo applied");
        true
    }

    fn transact<T>(
        &mut self,
        operation: impl FnOnce(&mut Graph) -> Result<T, GraphError>,
    ) -> Result<T, GraphError> {
        let snapshot = self.graph.clone();
        match operation(&mut self.graph) {
            Ok(value) => {
                self.push_undo(snapshot);
                self.redo.clear();
                Ok(value)
            }
            Err(err) => {
                // Failed edits leave no trace, in state or in history.
                self.graph = snapshot;
                Err(err)
            }
        }
    }

    fn push_undo(&mut self, snapshot: Graph) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
    }
}
