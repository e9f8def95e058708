//! Error types for Timeloom operations.
//!
//! Structural problems in a diagram are not errors — they are
//! [`Diagnostic`](timeloom_core::diagnostic::Diagnostic) values carried
//! alongside a best-effort result. [`TimeloomError`] covers the genuinely
//! fatal conditions: I/O, configuration, and serialization failures.

use std::io;

use thiserror::Error;

use timeloom_core::graph::GraphError;

/// The main error type for Timeloom operations.
#[derive(Debug, Error)]
pub enum TimeloomError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("export error: {0}")]
    Export(#[from] serde_json::Error),
}
