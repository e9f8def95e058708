//! Composite node identifiers.
//!
//! Every unit of work in a Timeloom diagram is identified by the pair of its
//! thread (the lane it runs on) and its short module name. The two parts are
//! stored structurally rather than as a joined string, so renaming a node or
//! moving it to another thread never has to re-parse an identifier.

use std::fmt;

/// Identity of a single unit of work: `thread:module`.
///
/// The composite form is globally unique; the module name alone is only
/// unique within its thread.
///
/// # Examples
///
/// ```
/// use timeloom_core::identifier::NodeId;
///
/// let id = NodeId::new("t0", "decode");
/// assert_eq!(id.thread(), "t0");
/// assert_eq!(id.name(), "decode");
/// assert_eq!(id.to_string(), "t0:decode");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    thread: String,
    name: String,
}

impl NodeId {
    /// Creates an identifier from a thread and a module name.
    pub fn new(thread: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            thread: thread.into(),
            name: name.into(),
        }
    }

    /// Splits a joined `thread:module` string at the first colon.
    ///
    /// Returns `None` when the separator is missing or either part is empty.
    /// Module names may themselves contain colons; thread names may not.
    pub fn parse(joined: &str) -> Option<Self> {
        let (thread, name) = joined.split_once(':')?;
        if thread.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(thread, name))
    }

    /// The thread (lane) this node runs on.
    pub fn thread(&self) -> &str {
        &self.thread
    }

    /// The short module name, unique within its thread.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identifier a node would have after moving to `thread`.
    pub fn with_thread(&self, thread: impl Into<String>) -> Self {
        Self {
            thread: thread.into(),
            name: self.name.clone(),
        }
    }

    /// Returns the identifier a node would have after renaming to `name`.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            thread: self.thread.clone(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.thread, self.name)
    }
}
