//! Build a parent-linked span tree from an OTLP trace payload.
//!
//! Spans live in an arena (`Vec<Span>`) owned by the `Trace`. Parent and child
//! links are `SpanIndex` values into that arena, so a child never owns its
//! parent and the tree has no reference cycles.
//!
//! The build runs in two passes over the spans:
//! 1. flatten resource -> scope -> span, convert timestamps, fill a lookup
//!    table keyed by `spanId`, and track the trace bounds
//! 2. link every span to its parent, keeping each child list sorted by start time

use crate::parser::otlp::{
    nanos_to_millis, InstrumentationScope, KeyValue, OtlpEnum, OtlpEvent, OtlpResource, OtlpSpan,
    SpanStatus, TracePayload,
};
use crate::utils::config::{SERVICE_NAME_KEY, UNKNOWN_SERVICE};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Position of a span inside `Trace::spans`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanIndex(usize);

impl SpanIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Resource shared by every span of one `resourceSpans` entry
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub service_name: String,
    pub attributes: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpanEvent {
    pub time_unix_ms: f64,
    pub name: String,
    pub attributes: Vec<KeyValue>,
}

/// A span with parsed timestamps and tree links
#[derive(Debug, Clone)]
pub struct Span {
    pub resource: Arc<Resource>,
    pub scope: Arc<InstrumentationScope>,

    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub name: String,
    pub kind: Option<OtlpEnum>,

    pub start_time_unix_ms: f64,
    pub end_time_unix_ms: f64,

    pub attributes: Vec<KeyValue>,
    pub events: Vec<SpanEvent>,
    pub status: SpanStatus,

    parent: Option<SpanIndex>,
    children: Vec<SpanIndex>,
}

impl Span {
    /// Parent span, if it was present in the payload
    pub fn parent(&self) -> Option<SpanIndex> {
        self.parent
    }

    /// Child spans ordered by ascending start time
    pub fn children(&self) -> &[SpanIndex] {
        &self.children
    }

    pub fn duration_ms(&self) -> f64 {
        self.end_time_unix_ms - self.start_time_unix_ms
    }

    fn declared_parent(&self) -> Option<&str> {
        self.parent_span_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Immutable span tree built from one trace payload
#[derive(Debug, Clone)]
pub struct Trace {
    /// The payload the tree was built from
    pub payload: TracePayload,

    pub start_time_unix_ms: f64,
    pub end_time_unix_ms: f64,

    spans: Vec<Span>,
    root_spans: Vec<SpanIndex>,
    lookup: HashMap<String, SpanIndex>,
}

impl Trace {
    pub fn span(&self, index: SpanIndex) -> &Span {
        &self.spans[index.0]
    }

    /// Spans without a resolvable parent, in payload order
    pub fn root_spans(&self) -> &[SpanIndex] {
        &self.root_spans
    }

    pub fn spans(&self) -> impl Iterator<Item = (SpanIndex, &Span)> {
        self.spans.iter().enumerate().map(|(i, s)| (SpanIndex(i), s))
    }

    /// Look up a span by its OTLP `spanId`
    pub fn find(&self, span_id: &str) -> Option<SpanIndex> {
        self.lookup.get(span_id).copied()
    }

    pub fn parent_of(&self, index: SpanIndex) -> Option<&Span> {
        self.span(index).parent.map(|p| self.span(p))
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    pub fn duration_ms(&self) -> f64 {
        self.end_time_unix_ms - self.start_time_unix_ms
    }

    /// Spans that cannot be reached from any root
    ///
    /// Only spans whose parent links form a cycle end up here; they are
    /// absent from `rows()` and from serialized trees.
    pub fn detached_spans(&self) -> Vec<SpanIndex> {
        let mut reachable = vec![false; self.spans.len()];
        let mut stack: Vec<SpanIndex> = self.root_spans.clone();
        while let Some(index) = stack.pop() {
            if !reachable[index.0] {
                reachable[index.0] = true;
                stack.extend_from_slice(&self.spans[index.0].children);
            }
        }

        (0..self.spans.len())
            .filter(|&i| !reachable[i])
            .map(SpanIndex)
            .collect()
    }

    /// Distinct service names, sorted
    pub fn service_names(&self) -> Vec<String> {
        self.spans
            .iter()
            .map(|s| s.resource.service_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Build the span tree for a trace payload
///
/// **Public** - main entry point for tree construction
///
/// Never fails: a span whose parent is missing from the payload is logged
/// and promoted to a root span. If two spans share a `spanId` the later
/// one replaces the earlier one.
pub fn build_trace(payload: TracePayload) -> Trace {
    let mut spans: Vec<Span> = Vec::with_capacity(payload.span_count());
    let mut lookup: HashMap<String, SpanIndex> = HashMap::with_capacity(payload.span_count());
    let mut bounds: Option<(f64, f64)> = None;

    // First pass: flatten, convert and index
    for resource_spans in &payload.resource_spans {
        let resource = Arc::new(parse_resource(resource_spans.resource.as_ref()));
        for scope_spans in &resource_spans.scope_spans {
            let scope = Arc::new(scope_spans.scope.clone().unwrap_or_default());
            for otel_span in &scope_spans.spans {
                let span = parse_span(otel_span, Arc::clone(&resource), Arc::clone(&scope));

                bounds = Some(match bounds {
                    None => (span.start_time_unix_ms, span.end_time_unix_ms),
                    Some((start, end)) => (
                        start.min(span.start_time_unix_ms),
                        end.max(span.end_time_unix_ms),
                    ),
                });

                match lookup.get(&span.span_id) {
                    Some(existing) => {
                        warn!("duplicate span id {}, keeping the last occurrence", span.span_id);
                        spans[existing.0] = span;
                    }
                    None => {
                        lookup.insert(span.span_id.clone(), SpanIndex(spans.len()));
                        spans.push(span);
                    }
                }
            }
        }
    }

    // Second pass: link children to parents
    let mut root_spans = Vec::new();
    for i in 0..spans.len() {
        let index = SpanIndex(i);
        let Some(parent_id) = spans[i].declared_parent() else {
            root_spans.push(index);
            continue;
        };

        let Some(&parent) = lookup.get(parent_id) else {
            warn!(
                "span {} has parent {} which has not been received yet",
                spans[i].span_id, parent_id
            );
            root_spans.push(index);
            continue;
        };

        if parent == index {
            warn!("span {} declares itself as its parent", spans[i].span_id);
            root_spans.push(index);
            continue;
        }

        spans[i].parent = Some(parent);
        let start = spans[i].start_time_unix_ms;
        let at = spans[parent.0]
            .children
            .partition_point(|c| spans[c.0].start_time_unix_ms < start);
        spans[parent.0].children.insert(at, index);
    }

    let (start_time_unix_ms, end_time_unix_ms) = bounds.unwrap_or((0.0, 0.0));

    debug!(
        "Built trace tree: {} spans, {} roots, {:.3}ms",
        spans.len(),
        root_spans.len(),
        end_time_unix_ms - start_time_unix_ms
    );

    let trace = Trace {
        payload,
        start_time_unix_ms,
        end_time_unix_ms,
        spans,
        root_spans,
        lookup,
    };

    let detached = trace.detached_spans();
    if !detached.is_empty() {
        let ids: Vec<&str> = detached.iter().map(|&i| trace.span(i).span_id.as_str()).collect();
        warn!(
            "{} span(s) form a parent cycle and are unreachable from any root: {}",
            detached.len(),
            ids.join(", ")
        );
    }

    trace
}

fn parse_resource(resource: Option<&OtlpResource>) -> Resource {
    let attributes = resource.map(|r| r.attributes.clone()).unwrap_or_default();
    let service_name = attributes
        .iter()
        .find(|attr| attr.key == SERVICE_NAME_KEY && attr.value.as_str().is_some())
        .and_then(|attr| attr.value.as_str())
        .unwrap_or(UNKNOWN_SERVICE)
        .to_string();

    Resource {
        service_name,
        attributes,
    }
}

fn parse_span(span: &OtlpSpan, resource: Arc<Resource>, scope: Arc<InstrumentationScope>) -> Span {
    Span {
        resource,
        scope,
        trace_id: span.trace_id.clone(),
        span_id: span.span_id.clone(),
        parent_span_id: span.parent_span_id.clone(),
        name: span.name.clone(),
        kind: span.kind.clone(),
        start_time_unix_ms: nanos_to_millis(span.start_time_unix_nano),
        end_time_unix_ms: nanos_to_millis(span.end_time_unix_nano),
        attributes: span.attributes.clone(),
        events: span.events.iter().map(parse_event).collect(),
        status: span.status.clone().unwrap_or_default(),
        parent: None,
        children: Vec::new(),
    }
}

fn parse_event(event: &OtlpEvent) -> SpanEvent {
    SpanEvent {
        time_unix_ms: nanos_to_millis(event.time_unix_nano),
        name: event.name.clone(),
        attributes: event.attributes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::otlp::{AttributeValue, ResourceSpans, ScopeSpans};

    fn span(id: &str, parent: Option<&str>, start: u64, end: u64) -> OtlpSpan {
        OtlpSpan {
            trace_id: "t1".to_string(),
            span_id: id.to_string(),
            parent_span_id: parent.map(str::to_string),
            name: format!("op-{}", id),
            start_time_unix_nano: start,
            end_time_unix_nano: end,
            ..Default::default()
        }
    }

    fn payload(spans: Vec<OtlpSpan>) -> TracePayload {
        TracePayload {
            resource_spans: vec![ResourceSpans {
                resource: None,
                scope_spans: vec![ScopeSpans { scope: None, spans }],
            }],
        }
    }

    #[test]
    fn test_empty_payload() {
        let trace = build_trace(TracePayload::default());
        assert_eq!(trace.span_count(), 0);
        assert!(trace.root_spans().is_empty());
        assert_eq!(trace.start_time_unix_ms, 0.0);
        assert_eq!(trace.end_time_unix_ms, 0.0);
    }

    #[test]
    fn test_zero_start_time_is_a_real_bound() {
        let trace = build_trace(payload(vec![
            span("a", None, 5_000_000, 9_000_000),
            span("b", None, 0, 1_000_000),
        ]));
        assert_eq!(trace.start_time_unix_ms, 0.0);
        assert_eq!(trace.end_time_unix_ms, 9.0);
    }

    #[test]
    fn test_empty_parent_id_is_root() {
        let trace = build_trace(payload(vec![span("a", Some(""), 1, 2)]));
        assert_eq!(trace.root_spans().len(), 1);
    }

    #[test]
    fn test_unknown_service_name() {
        let trace = build_trace(payload(vec![span("a", None, 1, 2)]));
        let root = trace.span(trace.root_spans()[0]);
        assert_eq!(root.resource.service_name, "unknown");
    }

    #[test]
    fn test_service_name_requires_string_value() {
        let resource = OtlpResource {
            attributes: vec![
                KeyValue::new("service.name", AttributeValue::IntValue(7)),
                KeyValue::new("service.name", AttributeValue::StringValue("checkout".to_string())),
            ],
        };
        assert_eq!(parse_resource(Some(&resource)).service_name, "checkout");
    }

    #[test]
    fn test_parent_cycle_is_reported_detached() {
        let trace = build_trace(payload(vec![
            span("root", None, 0, 10),
            span("a", Some("b"), 1, 2),
            span("b", Some("a"), 3, 4),
        ]));

        assert_eq!(trace.span_count(), 3);
        assert_eq!(trace.root_spans().len(), 1);
        assert_eq!(trace.rows().len(), 1);

        let detached: Vec<&str> = trace
            .detached_spans()
            .into_iter()
            .map(|i| trace.span(i).span_id.as_str())
            .collect();
        assert_eq!(detached, vec!["a", "b"]);
    }

    #[test]
    fn test_acyclic_trace_has_no_detached_spans() {
        let trace = build_trace(payload(vec![span("a", None, 1, 2), span("b", Some("a"), 1, 2)]));
        assert!(trace.detached_spans().is_empty());
    }

    #[test]
    fn test_duplicate_span_id_keeps_last() {
        let trace = build_trace(payload(vec![
            span("a", None, 1_000_000, 2_000_000),
            span("a", None, 3_000_000, 4_000_000),
        ]));
        assert_eq!(trace.span_count(), 1);
        assert_eq!(trace.span(trace.find("a").unwrap()).start_time_unix_ms, 3.0);
    }
}
