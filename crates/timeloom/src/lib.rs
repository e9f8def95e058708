//! Timeloom - a scheduling and layout engine for thread-timeline diagrams.
//!
//! Timeloom turns per-thread task descriptions (named units of work with
//! durations and cross-unit dependencies) into a validated, time-ordered
//! visual schedule: a dependency graph is built from raw records,
//! checked for structural consistency, scheduled with per-thread
//! serialization, laid out so every dependency arrow points strictly
//! left to right, and rendered to SVG.

pub mod config;
pub mod export;
pub mod layout;
pub mod scheduler;
pub mod session;
pub mod validator;

mod error;

pub use timeloom_core::{diagnostic, geometry, graph, identifier};
pub use timeloom_core::schedule::{ScheduledEntry, SchedulePlan};
pub use timeloom_parser::{BuildOutcome, schema};

pub use error::TimeloomError;
pub use layout::Layout;
pub use session::{DEFAULT_HISTORY_CAPACITY, Session};
pub use validator::Validation;

use indexmap::IndexMap;
use log::{debug, info};

use timeloom_core::diagnostic::Diagnostic;
use timeloom_core::graph::Graph;

use config::AppConfig;
use export::svg::SvgExporter;

/// Everything derived from one state of the graph: diagnostics, the
/// schedule, and the resolved geometry.
///
/// Recomputed in full after every change — derived data is never patched
/// incrementally.
#[derive(Debug)]
pub struct Analysis {
    diagnostics: Vec<Diagnostic>,
    plan: SchedulePlan,
    layout: Layout,
}

impl Analysis {
    /// Validation findings, in check order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The computed schedule.
    pub fn plan(&self) -> &SchedulePlan {
        &self.plan
    }

    /// The resolved geometry.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

/// Builder for importing, analyzing, and rendering timeline diagrams.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use timeloom::{TimelineBuilder, config::AppConfig};
///
/// let mut files = IndexMap::new();
/// files.insert(
///     "t0.json".to_string(),
///     r#"[ { "module": "a", "time": 10, "to": [ "b" ] },
///          { "module": "b", "time": 5, "from": [ "a" ] } ]"#
///         .to_string(),
/// );
///
/// let builder = TimelineBuilder::new(AppConfig::default());
/// let outcome = builder.import(&files);
/// let analysis = builder.analyze(outcome.graph());
/// let svg = builder.render_svg(outcome.graph(), &analysis);
/// assert!(svg.contains("Thread t0"));
/// ```
#[derive(Default)]
pub struct TimelineBuilder {
    config: AppConfig,
}

impl TimelineBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Builds a graph from raw thread files (file name → content).
    ///
    /// Unparsable files are skipped and reported in the outcome; this
    /// never fails as a whole.
    pub fn import(&self, files: &IndexMap<String, String>) -> BuildOutcome {
        info!(files = files.len(); "Importing thread files");
        timeloom_parser::build_graph(files)
    }

    /// Analyzes an import outcome, carrying its per-file parse errors
    /// ahead of the structural findings so one report covers the whole
    /// run.
    pub fn analyze_import(&self, outcome: &BuildOutcome) -> Analysis {
        let mut analysis = self.analyze(outcome.graph());
        let mut diagnostics = outcome.parse_errors().to_vec();
        diagnostics.append(&mut analysis.diagnostics);
        analysis.diagnostics = diagnostics;
        analysis
    }

    /// Validates, schedules, and lays out the graph.
    ///
    /// The scheduler runs exactly once, inside validation; the layout
    /// consumes its plan.
    pub fn analyze(&self, graph: &Graph) -> Analysis {
        info!(nodes = graph.len(); "Analyzing graph");
        let (diagnostics, plan) = validator::validate(graph).into_parts();
        debug!(
            findings = diagnostics.len(),
            scheduled = plan.scheduled_count(),
            unresolved = plan.unresolved().len();
            "Validation finished"
        );

        let layout = layout::resolve(graph, &plan, self.config.layout());
        Analysis {
            diagnostics,
            plan,
            layout,
        }
    }

    /// Renders an analyzed graph to an SVG string.
    pub fn render_svg(&self, graph: &Graph, analysis: &Analysis) -> String {
        let exporter = SvgExporter::new(self.config.layout(), self.config.style());
        exporter.render_string(
            graph,
            analysis.plan(),
            analysis.layout(),
            analysis.diagnostics(),
        )
    }

    /// Renders an analyzed graph and writes it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`TimeloomError::Io`] if the file cannot be written.
    pub fn write_svg(
        &self,
        graph: &Graph,
        analysis: &Analysis,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), TimeloomError> {
        let exporter = SvgExporter::new(self.config.layout(), self.config.style());
        let document = exporter.render(
            graph,
            analysis.plan(),
            analysis.layout(),
            analysis.diagnostics(),
        );
        exporter.write(path, &document)
    }

    /// Serializes the graph back to the interchange schema as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TimeloomError::Export`] if serialization fails.
    pub fn export_schema(&self, graph: &Graph) -> Result<String, TimeloomError> {
        export::schema::to_json(graph)
    }

    /// Starts an editing session over the graph.
    pub fn session(&self, graph: Graph) -> Session {
        Session::new(graph)
    }
}
