//! Error adapter for converting [`TimeloomError`] to miette diagnostics.
//!
//! Timeloom's fatal errors carry no source spans (structural findings
//! travel as non-fatal diagnostics instead), so this adapter only maps
//! each variant to a stable error code for miette's report renderer.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;

use timeloom::TimeloomError;

/// Adapter wrapping a [`TimeloomError`] for rich CLI reporting.
pub struct ErrorAdapter<'a>(pub &'a TimeloomError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            TimeloomError::Io(_) => "timeloom::io",
            TimeloomError::Graph(_) => "timeloom::graph",
            TimeloomError::Config(_) => "timeloom::config",
            TimeloomError::Export(_) => "timeloom::export",
        };
        Some(Box::new(code))
    }
}
