//! Output JSON schema for serialized trace trees.
//!
//! Schema is versioned to allow future evolution.

use crate::tree::{SpanIndex, Trace};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level document written by the `tree` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDocument {
    /// Schema version for compatibility checking
    pub version: String,

    pub start_time_unix_ms: f64,
    pub end_time_unix_ms: f64,
    pub span_count: usize,
    pub services: Vec<String>,
    pub root_spans: Vec<SpanNode>,
}

/// A span and its children, nested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanNode {
    pub trace_id: String,
    pub span_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    pub name: String,
    pub service_name: String,
    pub start_time_unix_ms: f64,
    pub end_time_unix_ms: f64,
    pub duration_ms: f64,

    #[serde(default)]
    pub error: bool,

    /// Attribute values rendered as text
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_spans: Vec<SpanNode>,
}

impl TreeDocument {
    /// Snapshot a trace, optionally cutting the tree below `max_depth`
    pub fn from_trace(trace: &Trace, max_depth: Option<usize>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            start_time_unix_ms: trace.start_time_unix_ms,
            end_time_unix_ms: trace.end_time_unix_ms,
            span_count: trace.span_count(),
            services: trace.service_names(),
            root_spans: trace
                .root_spans()
                .iter()
                .map(|&root| span_node(trace, root, 0, max_depth))
                .collect(),
        }
    }
}

fn span_node(trace: &Trace, index: SpanIndex, depth: usize, max_depth: Option<usize>) -> SpanNode {
    let span = trace.span(index);
    let child_spans = if max_depth.is_some_and(|max| depth >= max) {
        Vec::new()
    } else {
        span.children()
            .iter()
            .map(|&child| span_node(trace, child, depth + 1, max_depth))
            .collect()
    };

    SpanNode {
        trace_id: span.trace_id.clone(),
        span_id: span.span_id.clone(),
        parent_span_id: span.parent_span_id.clone().filter(|id| !id.is_empty()),
        name: span.name.clone(),
        service_name: span.resource.service_name.clone(),
        start_time_unix_ms: span.start_time_unix_ms,
        end_time_unix_ms: span.end_time_unix_ms,
        duration_ms: span.duration_ms(),
        error: span.status.is_error(),
        attributes: span
            .attributes
            .iter()
            .map(|kv| (kv.key.clone(), kv.value.render()))
            .collect(),
        child_spans,
    }
}
