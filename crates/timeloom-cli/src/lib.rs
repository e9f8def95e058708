//! CLI logic for the Timeloom diagram tool.
//!
//! Reads one JSON file per thread (or a directory of them), runs the
//! import → validate → schedule → layout pipeline, and writes the
//! rendered SVG. Structural findings are logged as warnings and the
//! diagram is still written — partial visibility with clear diagnostics
//! beats refusing to render.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{error, info, warn};

use timeloom::{TimeloomError, TimelineBuilder};

/// Run the Timeloom CLI application
///
/// # Errors
///
/// Returns `TimeloomError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Schema export errors
///
/// Parse failures and validation findings are not errors; they are
/// logged and the run still produces output.
pub fn run(args: &Args) -> Result<(), TimeloomError> {
    info!(
        inputs = args.inputs.len(),
        output_path = args.output.as_str();
        "Processing timeline"
    );

    // Load configuration
    let app_config = config::load_config(args.config.as_ref())?;

    // Collect thread files
    let files = collect_input_files(&args.inputs)?;

    // Process the diagram using the TimelineBuilder API
    let builder = TimelineBuilder::new(app_config);
    let outcome = builder.import(&files);

    let analysis = builder.analyze_import(&outcome);
    for diagnostic in analysis.diagnostics() {
        if diagnostic.severity().is_error() {
            error!(category = diagnostic.category().as_str(); "{}", diagnostic.message());
        } else {
            warn!(category = diagnostic.category().as_str(); "{}", diagnostic.message());
        }
    }

    builder.write_svg(outcome.graph(), &analysis, &args.output)?;
    info!(output_file = args.output.as_str(); "SVG exported successfully");

    if let Some(export_path) = &args.export {
        let schema = builder.export_schema(outcome.graph())?;
        fs::write(export_path, schema)?;
        info!(export_file = export_path.as_str(); "Schema exported successfully");
    }

    Ok(())
}

/// Maps each input file to its contents, keyed by file name.
///
/// A single directory argument expands to its `.json` entries, sorted
/// for deterministic thread order.
fn collect_input_files(inputs: &[String]) -> Result<IndexMap<String, String>, TimeloomError> {
    let mut paths = Vec::new();

    if let [only] = inputs
        && Path::new(only).is_dir()
    {
        let mut entries: Vec<_> = fs::read_dir(only)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json")
            })
            .collect();
        entries.sort();
        paths.extend(entries);
    } else {
        paths.extend(inputs.iter().map(PathBuf::from));
    }

    let mut files = IndexMap::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content = fs::read_to_string(&path)?;
        files.insert(name, content);
    }
    Ok(files)
}
