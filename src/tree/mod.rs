//! Trace tree construction and gantt row layout.
//!
//! This module transforms a parsed OTLP payload into:
//! - A parent-linked span tree with trace-wide time bounds
//! - Depth-first rows and relative bar geometry for gantt views

pub mod rows;
pub mod trace_tree;

// Re-export main types and functions
pub use rows::{format_duration, SpanRow, Viewport};
pub use trace_tree::{build_trace, Resource, Span, SpanEvent, SpanIndex, Trace};
