//! Timeloom Core Types and Definitions
//!
//! This crate provides the foundational types for the Timeloom timeline
//! diagram engine. It includes:
//!
//! - **Identifiers**: Composite `thread:module` node identifiers ([`identifier::NodeId`])
//! - **Graph**: The node/edge data structure and its invariant-preserving
//!   mutations ([`graph`] module)
//! - **Diagnostics**: Structured, non-fatal problem reports ([`diagnostic`] module)
//! - **Schedule**: Computed start/finish assignments ([`schedule`] module)
//! - **Geometry**: Box placement primitives for the renderer ([`geometry`] module)

pub mod diagnostic;
pub mod geometry;
pub mod graph;
pub mod identifier;
pub mod schedule;
