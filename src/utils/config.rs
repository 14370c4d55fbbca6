//! Configuration and constants shared across the crate.

/// Current version of the serialized tree/profile output
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Resource attribute holding the service name
pub const SERVICE_NAME_KEY: &str = "service.name";

/// Service name used when a resource carries no `service.name` attribute
pub const UNKNOWN_SERVICE: &str = "unknown";

// OTLP timestamps are nanoseconds, the tree works in milliseconds
pub const NANOS_PER_MILLI: f64 = 1e-6;

/// Default number of flamegraph nodes listed in the text summary
pub const DEFAULT_TOP_NODES: usize = 10;

/// Size of one encoded flamebearer node: (offset, total, self, name index)
pub const FLAMEBEARER_TUPLE_LEN: usize = 4;

/// Placeholder shown for empty string attribute values
pub const EMPTY_STRING_PLACEHOLDER: &str = "<empty string>";

// Field names for the span list (Tempo's legacy API uses "batches")
pub const RESOURCE_SPANS_FIELD_NAMES: &[&str] = &["resourceSpans", "batches"];

/// Some backends wrap the payload in a `trace` object
pub const TRACE_WRAPPER_FIELD: &str = "trace";
