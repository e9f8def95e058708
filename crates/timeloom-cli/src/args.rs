//! Command-line argument definitions for the Timeloom CLI.
//!
//! This module defines the [`Args`] structure parsed from the command
//! line using [`clap`]. Arguments control input/output paths,
//! configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Timeloom diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Thread files (JSON, one per thread), or a single directory of them
    #[arg(required = true, help = "Input thread files or a directory")]
    pub inputs: Vec<String>,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Also write the graph back to its interchange schema (JSON)
    #[arg(long)]
    pub export: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
