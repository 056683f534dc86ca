use assert_cmd::prelude::*;
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

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("orgchart").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

#[test]
fn cli_binds_org_chart_shapes() {
    let exe = assert_cmd::cargo_bin!("cartograph-cli");
    let output = Command::new(exe)
        .args([
            "bind",
            "--map",
            fixture("direction.map.json").to_string_lossy().as_ref(),
            fixture("direction.svg").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["state"], "ready");
    let ids: Vec<i64> = json["bindings"]
        .as_array()
        .expect("bindings array")
        .iter()
        .map(|b| b["activityId"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![101, 102, 103]);
    assert_eq!(json["bindings"][0]["url"], "http://localhost/activite?id=101");
}

#[test]
fn cli_prints_fit_transform() {
    let exe = assert_cmd::cargo_bin!("cartograph-cli");
    let output = Command::new(exe)
        .args([
            "fit",
            "--viewport-width",
            "800",
            "--viewport-height",
            "600",
            fixture("direction.svg").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["outcome"], "applied");
    assert_eq!(json["transform"], "translate(50px, 20px) scale(0.35)");
    assert_eq!(json["readout"], "35%");
}

#[test]
fn cli_writes_annotated_markup() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("annotated.svg");

    let exe = assert_cmd::cargo_bin!("cartograph-cli");
    Command::new(exe)
        .args([
            "annotate",
            "--map",
            fixture("direction.map.json").to_string_lossy().as_ref(),
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("direction.svg").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&out).expect("read output");
    assert_eq!(text.matches("data-activity-id=").count(), 3);
}

#[test]
fn cli_reports_missing_diagram() {
    let exe = assert_cmd::cargo_bin!("cartograph-cli");
    Command::new(exe)
        .args(["bind", "does-not-exist.svg"])
        .assert()
        .code(1);
}

#[test]
fn cli_usage_exits_with_2() {
    let exe = assert_cmd::cargo_bin!("cartograph-cli");
    Command::new(exe).arg("--bogus").assert().code(2);
}
