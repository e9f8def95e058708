//! The per-thread interchange schema.
//!
//! One payload per thread, each a JSON sequence of entry records:
//!
//! ```json
//! [
//!   { "module": "decode", "time": 10 },
//!   { "module": "blit", "time": 5,
//!     "from": [ { "module": "decode" } ],
//!     "to":   [ { "thread": "t1", "module": "mix" } ] }
//! ]
//! ```
//!
//! A reference's `thread` defaults to the thread of the file it appears
//! in, and a bare string reference names a module on that same thread.
//! The literal `"none"` (case-insensitive) in either part of a reference
//! means "no reference" and is dropped rather than reported.
//!
//! The same types serialize the graph back out for the export round-trip;
//! geometry is deliberately absent from this format.

use serde::{Deserialize, Serialize};

use timeloom_core::identifier::NodeId;

/// Sentinel meaning "no reference" in either part of a reference.
pub const NO_REFERENCE: &str = "none";

/// One unit of work as recorded in a thread file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    /// Short name, unique within the thread.
    pub module: String,

    /// Optional duration. Absent (or an empty string) means the node
    /// defaults to zero with no explicit value recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<RawTime>,

    /// References to the modules this one waits for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<RawRef>,

    /// References to the modules that wait for this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<RawRef>,
}

/// A duration value: a JSON number, or legacy text holding one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    Number(f64),
    Text(String),
}

impl RawTime {
    /// The explicit duration, or `None` when the value counts as absent.
    ///
    /// Text that does not parse as a number still counts as provided —
    /// it yields a non-finite duration that the validator reports, which
    /// is more useful than silently treating the node as instantaneous.
    pub fn value(&self) -> Option<f64> {
        match self {
            RawTime::Number(n) => Some(*n),
            RawTime::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(text.parse().unwrap_or(f64::NAN))
                }
            }
        }
    }
}

/// A reference to another module, qualified or bare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRef {
    /// `{ "thread": "t1", "module": "mix" }`; thread optional.
    Qualified {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread: Option<String>,
        module: String,
    },

    /// `"mix"` — a module on the current file's thread.
    Bare(String),
}

impl RawRef {
    /// Creates a fully qualified reference.
    pub fn qualified(thread: impl Into<String>, module: impl Into<String>) -> Self {
        RawRef::Qualified {
            thread: Some(thread.into()),
            module: module.into(),
        }
    }

    /// Resolves this reference against the thread of the file it appears
    /// in. Returns `None` for the `"none"` sentinel in either part.
    pub fn resolve(&self, default_thread: &str) -> Option<NodeId> {
        let (thread, module) = match self {
            RawRef::Qualified { thread, module } => {
                (thread.as_deref().unwrap_or(default_thread), module.as_str())
            }
            RawRef::Bare(module) => (default_thread, module.as_str()),
        };
        if is_no_reference(thread) || is_no_reference(module) {
            return None;
        }
        Some(NodeId::new(thread, module))
    }
}

/// A whole thread file: a sequence of entries, or a single bare entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPayload {
    Sequence(Vec<RawEntry>),
    Single(RawEntry),
}

impl RawPayload {
    /// Normalizes to a sequence of entries.
    pub fn into_entries(self) -> Vec<RawEntry> {
        match self {
            RawPayload::Sequence(entries) => entries,
            RawPayload::Single(entry) => vec![entry],
        }
    }
}

fn is_no_reference(text: &str) -> bool {
    text.eq_ignore_ascii_case(NO_REFERENCE)
}
