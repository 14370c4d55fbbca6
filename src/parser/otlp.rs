//! OTLP/JSON trace payload schema and parsing.
//!
//! Tracing backends return traces as nested `resourceSpans -> scopeSpans -> spans`.
//! Timestamps are unsigned nanosecond integers, usually encoded as strings.
//! They are validated while deserializing, so a payload that parses is safe to
//! hand to the tree builder.

use crate::utils::config::{
    EMPTY_STRING_PLACEHOLDER, NANOS_PER_MILLI, RESOURCE_SPANS_FIELD_NAMES, TRACE_WRAPPER_FIELD,
};
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Raw trace payload as returned by a tracing backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracePayload {
    #[serde(default, alias = "batches")]
    pub resource_spans: Vec<ResourceSpans>,
}

impl TracePayload {
    /// Total number of spans across all resources and scopes
    pub fn span_count(&self) -> usize {
        self.resource_spans
            .iter()
            .flat_map(|rs| &rs.scope_spans)
            .map(|ss| ss.spans.len())
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpans {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<OtlpResource>,

    #[serde(default, alias = "instrumentationLibrarySpans")]
    pub scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtlpResource {
    #[serde(default)]
    pub attributes: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSpans {
    #[serde(default, alias = "instrumentationLibrary", skip_serializing_if = "Option::is_none")]
    pub scope: Option<InstrumentationScope>,

    #[serde(default)]
    pub spans: Vec<OtlpSpan>,
}

/// Instrumentation scope that produced a group of spans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
}

/// A single OTLP span record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtlpSpan {
    #[serde(default)]
    pub trace_id: String,

    #[serde(default)]
    pub span_id: String,

    /// Empty or missing for root spans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OtlpEnum>,

    #[serde(
        default,
        deserialize_with = "deserialize_nanos_start",
        serialize_with = "serialize_nanos"
    )]
    pub start_time_unix_nano: u64,

    #[serde(
        default,
        deserialize_with = "deserialize_nanos_end",
        serialize_with = "serialize_nanos"
    )]
    pub end_time_unix_nano: u64,

    #[serde(default)]
    pub attributes: Vec<KeyValue>,

    #[serde(default)]
    pub events: Vec<OtlpEvent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SpanStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtlpEvent {
    #[serde(
        default,
        deserialize_with = "deserialize_nanos_event",
        serialize_with = "serialize_nanos"
    )]
    pub time_unix_nano: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub attributes: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<OtlpEnum>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SpanStatus {
    /// True for `2` or `STATUS_CODE_ERROR`
    pub fn is_error(&self) -> bool {
        match &self.code {
            Some(OtlpEnum::Number(code)) => *code == 2,
            Some(OtlpEnum::Name(name)) => name == "STATUS_CODE_ERROR",
            None => false,
        }
    }
}

/// OTLP enums are encoded either as integers or as their proto names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OtlpEnum {
    Number(i64),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,

    /// Unset values arrive as `{}` or with the field missing
    #[serde(default)]
    pub value: AttributeValue,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// OTLP `AnyValue`, keyed by its value kind (`{"stringValue": "..."}`)
///
/// An empty object, a null payload or an unknown kind becomes `Empty`
/// instead of failing the whole trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AttributeValue {
    StringValue(String),

    // 64-bit ints travel as strings in OTLP/JSON
    IntValue(i64),

    BoolValue(bool),

    DoubleValue(f64),

    ArrayValue(ArrayValue),

    KvlistValue(KeyValueList),

    BytesValue(String),

    #[default]
    Empty,
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let map = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => return Ok(AttributeValue::Empty),
            other => {
                return Err(D::Error::custom(format!(
                    "expected an AnyValue object, got {}",
                    other
                )))
            }
        };

        let Some((kind, value)) = map.into_iter().next() else {
            return Ok(AttributeValue::Empty);
        };
        if value.is_null() {
            return Ok(AttributeValue::Empty);
        }

        let parsed = match kind.as_str() {
            "stringValue" => serde_json::from_value(value).map(AttributeValue::StringValue),
            "intValue" => deserialize_int(value).map(AttributeValue::IntValue),
            "boolValue" => serde_json::from_value(value).map(AttributeValue::BoolValue),
            "doubleValue" => serde_json::from_value(value).map(AttributeValue::DoubleValue),
            "arrayValue" => serde_json::from_value(value).map(AttributeValue::ArrayValue),
            "kvlistValue" => serde_json::from_value(value).map(AttributeValue::KvlistValue),
            "bytesValue" => serde_json::from_value(value).map(AttributeValue::BytesValue),
            _ => {
                debug!("Unknown attribute value kind '{}', treating as empty", kind);
                Ok(AttributeValue::Empty)
            }
        };

        parsed.map_err(|e| D::Error::custom(format!("invalid {}: {}", kind, e)))
    }
}

impl Serialize for AttributeValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        match self {
            AttributeValue::StringValue(v) => map.serialize_entry("stringValue", v)?,
            AttributeValue::IntValue(v) => map.serialize_entry("intValue", &v.to_string())?,
            AttributeValue::BoolValue(v) => map.serialize_entry("boolValue", v)?,
            AttributeValue::DoubleValue(v) => map.serialize_entry("doubleValue", v)?,
            AttributeValue::ArrayValue(v) => map.serialize_entry("arrayValue", v)?,
            AttributeValue::KvlistValue(v) => map.serialize_entry("kvlistValue", v)?,
            AttributeValue::BytesValue(v) => map.serialize_entry("bytesValue", v)?,
            AttributeValue::Empty => {}
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<AttributeValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValueList {
    #[serde(default)]
    pub values: Vec<KeyValue>,
}

impl AttributeValue {
    /// Human readable form used by span detail views
    pub fn render(&self) -> String {
        match self {
            AttributeValue::StringValue(s) if s.is_empty() => EMPTY_STRING_PLACEHOLDER.to_string(),
            AttributeValue::StringValue(s) => s.clone(),
            AttributeValue::IntValue(i) => i.to_string(),
            AttributeValue::BoolValue(b) => b.to_string(),
            AttributeValue::DoubleValue(d) => d.to_string(),
            AttributeValue::ArrayValue(array) => array
                .values
                .iter()
                .map(AttributeValue::render)
                .collect::<Vec<_>>()
                .join(", "),
            AttributeValue::KvlistValue(list) => list
                .values
                .iter()
                .map(|kv| format!("{}={}", kv.key, kv.value.render()))
                .collect::<Vec<_>>()
                .join(", "),
            AttributeValue::BytesValue(b) => b.clone(),
            AttributeValue::Empty => String::new(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::StringValue(s) => Some(s),
            _ => None,
        }
    }
}

/// Parse a nanosecond timestamp from its decimal string encoding
///
/// # Errors
/// * `ParseError::InvalidTimestamp` - value is empty, negative or not an integer
pub fn parse_nanos(field: &'static str, value: &str) -> Result<u64, ParseError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

/// Scale a nanosecond timestamp to (fractional) milliseconds
pub fn nanos_to_millis(nanos: u64) -> f64 {
    nanos as f64 * NANOS_PER_MILLI
}

/// Parse a trace payload from JSON text
pub fn parse_trace_payload_str(raw: &str) -> Result<TracePayload, ParseError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    parse_trace_payload(&value)
}

/// Parse a trace payload from a JSON value
///
/// Accepts the plain `{ "resourceSpans": [...] }` shape, the legacy
/// `{ "batches": [...] }` shape, and either of them wrapped in `{ "trace": ... }`.
///
/// # Errors
/// * `ParseError::InvalidFormat` - payload is not a JSON object
/// * `ParseError::JsonError` - span data does not match the OTLP schema,
///   including non-numeric timestamps
pub fn parse_trace_payload(raw: &serde_json::Value) -> Result<TracePayload, ParseError> {
    let obj = raw.as_object().ok_or_else(|| {
        ParseError::InvalidFormat("Trace payload must be a JSON object".to_string())
    })?;

    if let Some(inner) = obj.get(TRACE_WRAPPER_FIELD) {
        if inner.is_object() {
            debug!("Unwrapping nested '{}' object", TRACE_WRAPPER_FIELD);
            return parse_trace_payload(inner);
        }
    }

    for field in RESOURCE_SPANS_FIELD_NAMES {
        if let Some(value) = obj.get(*field) {
            if value.is_array() {
                let resource_spans: Vec<ResourceSpans> = serde_json::from_value(value.clone())?;
                let payload = TracePayload { resource_spans };
                debug!(
                    "Parsed trace payload from '{}': {} resource spans, {} spans",
                    field,
                    payload.resource_spans.len(),
                    payload.span_count()
                );
                return Ok(payload);
            }
        }
    }

    warn!("No resource spans found in trace payload");
    Ok(TracePayload::default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInteger {
    Number(u64),
    Signed(i64),
    Text(String),
}

fn deserialize_nanos<'de, D>(deserializer: D, field: &'static str) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawInteger::deserialize(deserializer)? {
        RawInteger::Number(n) => Ok(n),
        RawInteger::Signed(n) => Err(serde::de::Error::custom(ParseError::InvalidTimestamp {
            field,
            value: n.to_string(),
        })),
        RawInteger::Text(s) => parse_nanos(field, &s).map_err(serde::de::Error::custom),
    }
}

fn deserialize_nanos_start<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_nanos(deserializer, "startTimeUnixNano")
}

fn deserialize_nanos_end<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_nanos(deserializer, "endTimeUnixNano")
}

fn deserialize_nanos_event<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_nanos(deserializer, "timeUnixNano")
}

fn serialize_nanos<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

fn deserialize_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawInteger::deserialize(deserializer)? {
        RawInteger::Number(n) => i64::try_from(n).map_err(serde::de::Error::custom),
        RawInteger::Signed(n) => Ok(n),
        RawInteger::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid intValue {:?}: {}", s, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nanos() {
        assert_eq!(parse_nanos("startTimeUnixNano", "1700000000000000000").unwrap(), 1_700_000_000_000_000_000);
        assert!(matches!(
            parse_nanos("startTimeUnixNano", "soon"),
            Err(ParseError::InvalidTimestamp { field: "startTimeUnixNano", .. })
        ));
        assert!(parse_nanos("endTimeUnixNano", "-5").is_err());
    }

    #[test]
    fn test_nanos_to_millis() {
        assert_eq!(nanos_to_millis(1_500_000), 1.5);
        assert_eq!(nanos_to_millis(0), 0.0);
    }

    #[test]
    fn test_attribute_value_tags() {
        let kv: KeyValue = serde_json::from_value(json!({
            "key": "http.status_code",
            "value": { "intValue": "200" }
        }))
        .unwrap();
        assert_eq!(kv.value, AttributeValue::IntValue(200));

        let kv: KeyValue = serde_json::from_value(json!({
            "key": "retries",
            "value": { "intValue": 3 }
        }))
        .unwrap();
        assert_eq!(kv.value, AttributeValue::IntValue(3));
    }

    #[test]
    fn test_status_is_error() {
        let status = SpanStatus {
            code: Some(OtlpEnum::Name("STATUS_CODE_ERROR".to_string())),
            message: None,
        };
        assert!(status.is_error());
        assert!(!SpanStatus::default().is_error());
    }

    #[test]
    fn test_unset_attribute_values() {
        let attrs: Vec<KeyValue> = serde_json::from_value(json!([
            { "key": "empty", "value": {} },
            { "key": "missing" },
            { "key": "null", "value": { "stringValue": null } },
            { "key": "future", "value": { "someNewValue": 1 } }
        ]))
        .unwrap();

        assert!(attrs.iter().all(|kv| kv.value == AttributeValue::Empty));
        assert_eq!(attrs[0].value.render(), "");
    }

    #[test]
    fn test_attribute_value_serializes_tagged() {
        assert_eq!(
            serde_json::to_value(AttributeValue::IntValue(42)).unwrap(),
            json!({ "intValue": "42" })
        );
        assert_eq!(serde_json::to_value(AttributeValue::Empty).unwrap(), json!({}));
        assert!(serde_json::from_value::<AttributeValue>(json!({ "boolValue": "yes" })).is_err());
    }
}
