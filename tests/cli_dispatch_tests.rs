use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_engagement")
}

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("engagement-{name}-{stamp}.{ext}"))
}

const SCENARIO: &str = r#"{
    "name": "harpy-vs-44875",
    "assets": [{"callsign": "HARPY 02", "trackcategory": "air", "weapon": "4XAIM-120"}],
    "target": {"id": 44875, "Track Cat": "Air"},
    "catalogs": {
        "red_air_deliverables_air_to_air": [
            {"weapon": "AIM-120C AMRAAM", "effectiveness_percentage": 92}
        ]
    }
}"#;

#[test]
fn evaluate_command_emits_engine_output() {
    let path = unique_temp_path("scenario", "json");
    fs::write(&path, SCENARIO).expect("fixture should be written");

    let output = Command::new(bin())
        .args(["evaluate", path.to_string_lossy().as_ref()])
        .output()
        .expect("evaluate should run");

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("evaluate should emit json");
    assert_eq!(payload["authorization_code"], 4);
    assert_eq!(payload["enemy_side"], "air");
    assert_eq!(payload["results"][0]["shots_needed_for_threshold"], 1);

    let _ = fs::remove_file(path);
}

#[test]
fn batch_command_reports_each_scenario() {
    let path = unique_temp_path("batch", "json");
    let rejected = r#"{"name": "no-target", "assets": [{"callsign": "HARPY 02"}]}"#;
    fs::write(&path, format!("[{SCENARIO}, {rejected}]")).expect("fixture should be written");

    let output = Command::new(bin())
        .args(["batch", path.to_string_lossy().as_ref(), "--workers", "2"])
        .output()
        .expect("batch should run");

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("batch should emit json");
    let items = payload.as_array().expect("array of items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "harpy-vs-44875");
    assert_eq!(items[0]["output"]["authorization_code"], 4);
    assert_eq!(items[1]["error"], "scenario has no target");

    let _ = fs::remove_file(path);
}

#[test]
fn parse_command_prints_tokens() {
    let output = Command::new(bin())
        .args(["parse", "2XAIM-9, 4XAIM-120"])
        .output()
        .expect("parse should run");

    assert_eq!(output.status.code(), Some(0));
    let tokens: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("parse should emit json");
    assert_eq!(tokens[0]["base_code"], "AIM-9");
    assert_eq!(tokens[1]["quantity"], 4);
}

#[test]
fn validate_command_returns_non_zero_on_invalid_catalog() {
    let path = unique_temp_path("catalog", "csv");
    fs::write(&path, "deliverable,effectiveness\nGBU-12 Paveway II,abc\n")
        .expect("fixture should be written");

    let output = Command::new(bin())
        .args(["validate", path.to_string_lossy().as_ref()])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unparseable effectiveness"));
    assert!(stdout.contains("1 error(s)"));

    let _ = fs::remove_file(path);
}

#[test]
fn missing_command_is_a_usage_error() {
    let output = Command::new(bin()).output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
}
