//! Structured, non-fatal problem reports.
//!
//! Nothing the engine finds in a diagram is fatal: parse failures skip a
//! single file, validation findings are surfaced next to a best-effort
//! render, and unresolvable nodes are simply left out of the schedule.
//! Every such finding is a [`Diagnostic`] with a [`Severity`], a
//! [`Category`], and a human-readable message naming the offending
//! node(s).

use std::fmt;

/// The severity level of a diagnostic.
///
/// - [`Severity::Error`] means input was lost (for example a file that
///   could not be parsed and was skipped).
/// - [`Severity::Warning`] means the diagram rendered, but something in it
///   is structurally suspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Input was dropped; the rest of the diagram is still processed.
    Error,

    /// Advisory finding; scheduling and rendering proceed.
    Warning,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What kind of problem a diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A single input file failed to parse and was skipped.
    ///
    /// Produced by the importer, never by the validator.
    Parse,

    /// An explicitly provided duration is not a finite positive number.
    InvalidDuration,

    /// A thread has more than one node with no incoming dependency.
    DuplicateEntryPoint,

    /// One side of a dependency edge is recorded without the other.
    EdgeAsymmetry,

    /// An edge references a node id that does not exist.
    DanglingReference,

    /// Two nodes share a thread but no dependency path orders them.
    AmbiguousOrdering,

    /// A node could not be scheduled (cycle, or downstream of one).
    UnresolvedDependency,
}

impl Category {
    /// Stable kebab-case name, usable as a machine-readable tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Parse => "parse-error",
            Category::InvalidDuration => "invalid-duration",
            Category::DuplicateEntryPoint => "duplicate-entry-point",
            Category::EdgeAsymmetry => "edge-asymmetry",
            Category::DanglingReference => "dangling-reference",
            Category::AmbiguousOrdering => "ambiguous-ordering",
            Category::UnresolvedDependency => "unresolved-dependency",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single structural or scheduling finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    category: Category,
    message: String,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            message: message.into(),
        }
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the category of this diagnostic.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Get the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}
