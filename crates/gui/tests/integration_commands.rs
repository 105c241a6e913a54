//! Integration tests for the AgentCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use cubecad_lib::command::{execute_json, execute_json_batch};
use cubecad_lib::harness::TestHarness;

#[test]
fn test_command_place_erase() {
    let mut h = TestHarness::new();

    let resp = execute_json(&mut h, r#"{"command": "place", "x": 1, "y": 1, "z": 1}"#).unwrap();
    assert!(resp.success);
    assert_eq!(h.cube_count(), 1);

    let resp = execute_json(&mut h, r#"{"command": "erase", "x": 1, "y": 1, "z": 1}"#).unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["erased"], true);
    assert_eq!(h.cube_count(), 0);
    assert_eq!(h.log_text(), "1:P(1,1,1)\n2:E(1,1,1)");
}

#[test]
fn test_command_place_outside_grid_is_noop() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "place", "x": 17, "y": 1, "z": 1}"#).unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["placed"], false);
    assert_eq!(h.log_text(), "");
}

#[test]
fn test_command_full_workflow_via_json_batch() {
    let mut h = TestHarness::new();

    let json = r#"[
        {"command": "place", "x": 1, "y": 1, "z": 1},
        {"command": "place", "x": 2, "y": 1, "z": 1},
        {"command": "place", "x": 5, "y": 5, "z": 1},
        {"command": "export", "x": 2, "y": 1, "z": 1},
        {"command": "inspect"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses.len(), 5);
    for resp in &responses {
        assert!(resp.success, "Failed: {:?}", resp.error);
    }

    let export = responses[3].data.as_ref().unwrap();
    assert_eq!(export["cells"], 2);
    assert_eq!(export["vertices"], 16);
    assert_eq!(export["triangles"], 24);

    let inspect = responses[4].data.as_ref().unwrap();
    assert_eq!(inspect["cube_count"], 3);
}

#[test]
fn test_command_hover_and_click() {
    let mut h = TestHarness::new();
    let pointer = h.screen_point([4.5, 4.5, 0.0]).unwrap();

    let hover = format!(r#"{{"command": "hover", "x": {}, "y": {}}}"#, pointer[0], pointer[1]);
    let resp = execute_json(&mut h, &hover).unwrap();
    let data = resp.data.unwrap();
    assert_eq!(data["kind"], "ground");
    assert_eq!(data["cell"], serde_json::json!([5, 5, 1]));

    let click = format!(r#"{{"command": "click", "x": {}, "y": {}}}"#, pointer[0], pointer[1]);
    let resp = execute_json(&mut h, &click).unwrap();
    let data = resp.data.unwrap();
    assert_eq!(data["result"], "placed");
    assert_eq!(data["cell"], serde_json::json!([5, 5, 1]));
    assert_eq!(h.log_text(), "1:P(5,5,1)");
}

#[test]
fn test_command_click_in_export_mode_reports_part() {
    let mut h = TestHarness::new();
    h.place(3, 3, 0);
    h.place(4, 3, 0);

    let resp = execute_json(&mut h, r#"{"command": "set_mode", "mode": "exporting"}"#).unwrap();
    assert!(resp.success);

    let pointer = h.screen_point([3.5, 3.5, 1.0]).unwrap();
    let click = format!(r#"{{"command": "click", "x": {}, "y": {}}}"#, pointer[0], pointer[1]);
    let resp = execute_json(&mut h, &click).unwrap();
    let data = resp.data.unwrap();
    assert_eq!(data["result"], "export");
    assert_eq!(data["cells"], 2);
    // Export never edits the grid or the log
    assert_eq!(h.cube_count(), 2);
    assert_eq!(h.log_text(), "1:P(4,4,1)\n2:P(5,4,1)");
}

#[test]
fn test_command_export_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = TestHarness::new();
    h.place(0, 0, 0);

    let target = dir.path().join("my part.3mf");
    let json = serde_json::json!({
        "command": "export",
        "x": 1, "y": 1, "z": 1,
        "path": target.to_string_lossy(),
    })
    .to_string();
    let resp = execute_json(&mut h, &json).unwrap();
    assert!(resp.success, "{:?}", resp.error);

    let written = dir.path().join("mypart.3mf");
    assert_eq!(resp.data.unwrap()["path"], written.display().to_string());
    assert!(written.exists());
}

#[test]
fn test_command_save_and_load_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");
    let mut h = TestHarness::new();

    let save = serde_json::json!({
        "command": "save_log",
        "path": path.to_string_lossy(),
    })
    .to_string();
    execute_json(&mut h, r#"{"command": "place", "x": 3, "y": 2, "z": 1}"#).unwrap();
    assert!(execute_json(&mut h, &save).unwrap().success);

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "1:P(3,2,1)");

    execute_json(&mut h, r#"{"command": "clear"}"#).unwrap();
    assert_eq!(h.cube_count(), 0);

    let load = serde_json::json!({ "command": "load_log", "text": text }).to_string();
    let resp = execute_json(&mut h, &load).unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["cube_count"], 1);
    assert!(h.contains(2, 1, 0));
}

#[test]
fn test_command_unknown_is_error() {
    let mut h = TestHarness::new();
    assert!(execute_json(&mut h, r#"{"command": "fly"}"#).is_err());
    assert!(execute_json_batch(&mut h, r#"{"command": "clear"}"#).is_err());
}
