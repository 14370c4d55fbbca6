//! Payload parsing and schema definitions.
//!
//! This module handles:
//! - Parsing OTLP/JSON traces returned by tracing backends
//! - Parsing Pyroscope flamebearer profiles
//! - Validating timestamps and payload shape

pub mod flamebearer;
pub mod otlp;

// Re-export main types
pub use flamebearer::{parse_profile_response, Flamebearer, ProfileMetadata, ProfileResponse, Timeline};
pub use otlp::{
    nanos_to_millis, parse_nanos, parse_trace_payload, parse_trace_payload_str, AttributeValue,
    InstrumentationScope, KeyValue, OtlpEnum, OtlpEvent, OtlpResource, OtlpSpan, ResourceSpans, ScopeSpans, SpanStatus,
    TracePayload,
};
