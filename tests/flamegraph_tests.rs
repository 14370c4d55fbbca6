use perses_trace::flamegraph::{
    build_profile, find_total, focus_on, generate_text_summary, table_rows, ProfileNode,
};
use perses_trace::parser::parse_profile_response;
use serde_json::json;

// total(100) -> main(100) -> { work(60), idle(30) }, work -> compress(40)
fn sample_profile() -> serde_json::Value {
    json!({
        "flamebearer": {
            "names": ["total", "main", "work", "idle", "compress"],
            "levels": [
                [0, 100, 0, 0],
                [0, 100, 10, 1],
                [0, 60, 20, 2, 10, 30, 30, 3],
                [0, 40, 40, 4]
            ],
            "numTicks": 100,
            "maxSelf": 40
        },
        "metadata": {
            "spyName": "gospy",
            "sampleRate": 100,
            "units": "samples",
            "name": "cpu"
        },
        "timeline": {
            "startTime": 1700000000,
            "samples": [1, 2, 3],
            "durationDelta": 10
        }
    })
}

fn root() -> ProfileNode {
    let response = parse_profile_response(&sample_profile()).unwrap();
    build_profile(&response).unwrap().root.unwrap()
}

fn names(node: &ProfileNode) -> Vec<String> {
    let mut out = Vec::new();
    node.walk(&mut |n| out.push(n.name.clone()));
    out
}

#[test]
fn test_build_profile_tree() {
    let response = parse_profile_response(&sample_profile()).unwrap();
    let profile = build_profile(&response).unwrap();

    assert_eq!(profile.num_ticks, 100);
    assert_eq!(profile.max_self, 40);
    assert_eq!(profile.metadata.units, "samples");
    assert_eq!(profile.timeline.samples, vec![1, 2, 3]);

    let root = profile.root.unwrap();
    assert_eq!(root.id, 1);
    assert_eq!(root.name, "total");
    assert_eq!(names(&root), vec!["total", "main", "work", "compress", "idle"]);

    let main = &root.children[0];
    assert_eq!(main.level, 1);
    assert_eq!(main.self_value, 10);

    let idle = &main.children[1];
    assert_eq!((idle.start, idle.end), (70, 100));
    assert_eq!(idle.id, 4);
}

#[test]
fn test_focus_narrows_path() {
    let root = root();
    let focused = focus_on(&root, 5);

    assert_eq!(names(&focused), vec!["total", "main", "work", "compress"]);
    assert_eq!((focused.start, focused.end), (0, 40));
    assert_eq!(focused.total, 100);
}

#[test]
fn test_focus_unknown_id_is_noop() {
    let root = root();
    assert_eq!(focus_on(&root, 999), root);
}

#[test]
fn test_focus_keeps_subtree() {
    let root = root();
    let focused = focus_on(&root, 3);

    let work = &focused.children[0].children[0];
    assert_eq!(work.name, "work");
    assert_eq!(work.children.len(), 1);
}

#[test]
fn test_find_total() {
    let root = root();
    assert_eq!(find_total(&root, 3), Some(60));
    assert_eq!(find_total(&root, 42), None);
}

#[test]
fn test_table_rows_search() {
    let root = root();

    assert_eq!(table_rows(&root, "").len(), 5);

    let rows = table_rows(&root, "COMP");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "compress");
    assert_eq!(rows[0].self_value, 40);
    assert_eq!(rows[0].total, 40);

    assert!(table_rows(&root, "--").is_empty());
}

#[test]
fn test_text_summary_ranks_by_self() {
    let summary = generate_text_summary(&root(), 2, "samples");
    let lines: Vec<&str> = summary.lines().collect();

    assert!(lines[0].contains("samples"));
    assert!(lines[3].contains("compress"));
    assert!(lines[4].contains("idle"));
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_missing_flamebearer_rejected() {
    assert!(parse_profile_response(&json!({ "metadata": {} })).is_err());
    assert!(parse_profile_response(&json!([])).is_err());
}
