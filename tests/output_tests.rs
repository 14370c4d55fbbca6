use perses_trace::output::{read_json_value, render_trace, validate_path, write_json, TreeDocument};
use perses_trace::parser::parse_trace_payload;
use perses_trace::tree::build_trace;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;
use tempfile::NamedTempFile;

fn nested_trace() -> serde_json::Value {
    json!({
        "resourceSpans": [{
            "resource": {
                "attributes": [
                    { "key": "service.name", "value": { "stringValue": "api" } }
                ]
            },
            "scopeSpans": [{
                "spans": [
                    {
                        "traceId": "t", "spanId": "a", "name": "handler",
                        "startTimeUnixNano": "0", "endTimeUnixNano": "10000000",
                        "attributes": [
                            { "key": "http.route", "value": { "stringValue": "" } },
                            { "key": "cached", "value": { "boolValue": false } }
                        ]
                    },
                    {
                        "traceId": "t", "spanId": "b", "parentSpanId": "a", "name": "query",
                        "startTimeUnixNano": "2000000", "endTimeUnixNano": "6000000",
                        "status": { "code": "STATUS_CODE_ERROR" }
                    },
                    {
                        "traceId": "t", "spanId": "c", "parentSpanId": "b", "name": "connect",
                        "startTimeUnixNano": "2000000", "endTimeUnixNano": "3000000"
                    }
                ]
            }]
        }]
    })
}

#[test]
fn test_tree_document_nests_children() {
    let trace = build_trace(parse_trace_payload(&nested_trace()).unwrap());
    let document = TreeDocument::from_trace(&trace, None);

    assert_eq!(document.span_count, 3);
    assert_eq!(document.services, vec!["api"]);
    assert_eq!(document.root_spans.len(), 1);

    let handler = &document.root_spans[0];
    assert_eq!(handler.duration_ms, 10.0);
    assert_eq!(handler.attributes["http.route"], "<empty string>");
    assert_eq!(handler.attributes["cached"], "false");

    let query = &handler.child_spans[0];
    assert!(query.error);
    assert_eq!(query.parent_span_id.as_deref(), Some("a"));
    assert_eq!(query.child_spans[0].name, "connect");
}

#[test]
fn test_tree_document_max_depth() {
    let trace = build_trace(parse_trace_payload(&nested_trace()).unwrap());
    let document = TreeDocument::from_trace(&trace, Some(1));

    let query = &document.root_spans[0].child_spans[0];
    assert!(query.child_spans.is_empty());
}

#[test]
fn test_write_and_read_document() {
    let trace = build_trace(parse_trace_payload(&nested_trace()).unwrap());
    let document = TreeDocument::from_trace(&trace, None);
    let temp_file = NamedTempFile::new().unwrap();

    write_json(&document, temp_file.path()).unwrap();

    let loaded: TreeDocument = serde_json::from_value(read_json_value(temp_file.path()).unwrap()).unwrap();
    assert_eq!(loaded, document);
}

#[test]
fn test_write_creates_parent_dirs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let nested_path = temp_dir.path().join("nested/dirs/tree.json");

    write_json(&json!({ "ok": true }), &nested_path).unwrap();

    assert!(nested_path.exists());
}

#[test]
fn test_validate_output_path_empty() {
    assert!(validate_path(Path::new("")).is_err());
}

#[test]
fn test_validate_output_path_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    assert!(validate_path(temp_dir.path()).is_err());
}

#[test]
fn test_read_missing_file() {
    assert!(read_json_value("/definitely/not/here.json").is_err());
}

#[test]
fn test_render_trace_lists_every_span() {
    let trace = build_trace(parse_trace_payload(&nested_trace()).unwrap());
    let text = render_trace(&trace, None);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[1].contains("handler [api]"));
    assert!(lines[2].contains("  query [api]"));
    assert!(lines[2].contains('!'));
    assert!(lines[3].contains("    connect [api]"));
    assert!(lines[3].ends_with("1ms"));

    assert_eq!(render_trace(&trace, Some(0)).lines().count(), 2);
}
