use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture() -> PathBuf {
    let path = repo_root().join("fixtures").join("lancaster.json");
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn cli_lays_out_fixture_file() {
    let exe = assert_cmd::cargo_bin!("lineage-cli");
    let output = Command::new(exe)
        .arg(fixture().to_string_lossy().as_ref())
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let chart = stdout_json(&output);
    assert_eq!(chart["nodes"].as_array().unwrap().len(), 19);
    let edges = chart["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 29);
    assert_eq!(chart["nodes"][0]["type"], "person");
    assert_eq!(chart["nodes"][0]["label"], "Edward Lancaster (♂)");
}

#[test]
fn cli_reads_dataset_from_stdin() {
    let exe = assert_cmd::cargo_bin!("lineage-cli");
    let input = r#"[
      { "id": "a", "name": "A", "dob": "1940-01-01", "partner": ["b"] },
      { "id": "b", "name": "B", "dob": "1941-01-01", "partner": ["a"] },
      { "id": "c", "name": "C", "dob": "1970-01-01", "father": "a", "mother": "b" }
    ]"#;
    let assert = assert_cmd::Command::new(exe)
        .args(["chart", "-"])
        .write_stdin(input)
        .assert()
        .success();

    let chart: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(chart["nodes"][2]["id"], "c");
    assert_eq!(chart["nodes"][2]["position"]["x"], 100.0);
    assert_eq!(chart["nodes"][2]["position"]["y"], 200.0);
}

#[test]
fn cli_prints_generation_levels() {
    let exe = assert_cmd::cargo_bin!("lineage-cli");
    let output = Command::new(exe)
        .args(["generations", fixture().to_string_lossy().as_ref()])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let levels = stdout_json(&output);
    assert_eq!(levels["1"], 0);
    assert_eq!(levels["3"], 1);
    assert_eq!(levels["10"], 2);
    assert_eq!(levels["19"], 3);
}

#[test]
fn cli_applies_config_overrides() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("options.json");
    fs::write(&config, r#"{ "rowHeight": 100 }"#).expect("write config");

    let exe = assert_cmd::cargo_bin!("lineage-cli");
    let output = Command::new(exe)
        .args([
            "--config",
            config.to_string_lossy().as_ref(),
            fixture().to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let chart = stdout_json(&output);
    let deepest = chart["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["position"]["y"].as_f64())
        .fold(0.0_f64, f64::max);
    assert_eq!(deepest, 300.0);
}

#[test]
fn cli_strict_mode_rejects_dangling_parent() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dataset = tmp.path().join("dangling.json");
    fs::write(
        &dataset,
        r#"[{ "id": "a", "name": "A", "dob": "1940-01-01", "father": "ghost" }]"#,
    )
    .expect("write dataset");

    let exe = assert_cmd::cargo_bin!("lineage-cli");
    let output = Command::new(&exe)
        .args(["--strict", dataset.to_string_lossy().as_ref()])
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("person a references unknown father ghost"),
        "stderr: {stderr}"
    );

    Command::new(&exe)
        .arg(dataset.to_string_lossy().as_ref())
        .assert()
        .success();
}

#[test]
fn cli_reports_cycles() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dataset = tmp.path().join("cycle.json");
    fs::write(
        &dataset,
        r#"[
          { "id": "a", "name": "A", "dob": "1940-01-01", "father": "b" },
          { "id": "b", "name": "B", "dob": "1940-01-01", "father": "a" }
        ]"#,
    )
    .expect("write dataset");

    let exe = assert_cmd::cargo_bin!("lineage-cli");
    let output = Command::new(exe)
        .arg(dataset.to_string_lossy().as_ref())
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cyclic ancestry: a -> b -> a"));
}

#[test]
fn cli_rejects_unknown_flags_with_usage() {
    let exe = assert_cmd::cargo_bin!("lineage-cli");
    let output = Command::new(exe)
        .arg("--bogus")
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("USAGE:"));
}
