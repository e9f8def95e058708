//! Parser and graph builder for Timeloom thread files.
//!
//! Each input file describes one execution thread as a JSON sequence of
//! entry records; the file's base name is the thread identifier. This
//! crate parses those payloads ([`schema`]) and assembles them into a
//! single dependency graph ([`build_graph`]), collecting one parse
//! diagnostic per unreadable file instead of aborting.

pub mod schema;

mod builder;

pub use builder::{BuildOutcome, build_graph, build_records};
