use std::path::Path;
use std::process::{Command, Output};

const OBSERVATIONS: &str = r#"[
  {"Category": "Tổ xe", "Content": "Số chuyến xe", "Year": 2025, "Month": 1, "Week": 1, "Value": 10},
  {"Category": "Tổ xe", "Content": "Số chuyến xe", "Year": 2025, "Month": 1, "Week": 2, "Value": 15},
  {"Category": "Lễ tân", "Content": "Số khách", "Year": 2025, "Month": 1, "Week": 1, "Value": 4},
  {"Category": "Lễ tân", "Content": "Số khách", "Year": 2025, "Month": 1, "Week": 2, "Value": 2}
]"#;

fn opsreport(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_opsreport"))
        .args(args)
        .output()
        .unwrap()
}

fn write_input(dir: &Path) -> String {
    let path = dir.join("week.json");
    std::fs::write(&path, OBSERVATIONS).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn pivot_prints_grouped_text_in_priority_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());

    let output = opsreport(&["pivot", "--input", &input]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let reception = stdout.find("[Lễ tân]").unwrap();
    let transport = stdout.find("[Tổ xe]").unwrap();
    assert!(reception < transport);
    assert!(stdout.contains("15 (↑50.0%)"));
    assert!(stdout.contains("2 (↓50.0%)"));
}

#[test]
fn pivot_json_applies_filters() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());

    let output = opsreport(&[
        "pivot",
        "--input",
        &input,
        "--rows",
        "category",
        "--weeks",
        "2",
        "--format",
        "json",
    ]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["pivot"]["rows"].as_array().unwrap().len(), 2);
    assert_eq!(json["coverage"]["total"], 2);
    assert_eq!(json["coverage"]["with_ratio"], 2);
}

#[test]
fn overlapping_dimensions_exit_with_usage_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());

    let output = opsreport(&["pivot", "--input", &input, "--rows", "week", "--cols", "week"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn missing_source_is_a_usage_error() {
    let output = opsreport(&["pivot"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn publish_then_pivot_from_store() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let db = dir.path().join("snapshots.sqlite3");
    let db = db.to_str().unwrap();

    let published = opsreport(&["publish", "--input", &input, "--store", db]);
    assert!(published.status.success());
    let receipt: serde_json::Value = serde_json::from_slice(&published.stdout).unwrap();
    assert_eq!(receipt["metadata"]["filename"], "week.json");
    assert_eq!(receipt["metadata"]["row_count"], 4);

    let pivot = opsreport(&["pivot", "--store", db, "--format", "json"]);
    assert!(pivot.status.success());
    let report: serde_json::Value = serde_json::from_slice(&pivot.stdout).unwrap();
    assert_eq!(report["pivot"]["rows"].as_array().unwrap().len(), 2);

    let info = opsreport(&["info", "--store", db]);
    assert!(info.status.success());
    let info: serde_json::Value = serde_json::from_slice(&info.stdout).unwrap();
    assert_eq!(info["storage"]["total_slots"], 2);
    assert_eq!(info["last_publish"]["row_count"], 4);
}
