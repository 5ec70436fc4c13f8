use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

fn bundle() -> Value {
    json!({
        "params": {"vote_window_hours": 48, "clamp_vote_end_to_match_day": false},
        "matches": [
            {
                "id": "m1",
                "scheduled_at": "2025-03-01T10:00:00Z",
                "teams": ["Red", "Blue"],
                "score_matrix": [[5, 3], [2, 1]],
                "votes": ["p1", "p1", "p2"]
            }
        ]
    })
}

fn write_bundle(dir: &tempfile::TempDir, v: &Value) -> std::path::PathBuf {
    let p = dir.path().join("season.json");
    fs::write(&p, serde_json::to_vec(v).unwrap()).unwrap();
    p
}

fn md() -> Command {
    Command::cargo_bin("md").unwrap()
}

#[test]
fn prints_canonical_report_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bundle(&dir, &bundle());

    let out = md()
        .args(["--input", input.to_str().unwrap(), "--now", "2025-03-10T00:00:00Z"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&out).unwrap();
    assert!(report["id"].as_str().unwrap().starts_with("RPT:"));
    assert_eq!(report["evaluated_at"], "2025-03-10T00:00:00Z");
    assert_eq!(report["awards"]["overall"], json!({"p1": 1}));
    assert_eq!(report["matches"][0]["phase"], "closed");
}

#[test]
fn same_now_gives_same_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bundle(&dir, &bundle());
    let run = || {
        md().args(["--input", input.to_str().unwrap(), "--now", "2025-03-02T00:00:00Z"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn vote_hours_override_changes_phase() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bundle(&dir, &bundle());

    // 2025-03-02T09:00Z is inside the 48h bundle window but past a 12h one.
    let phase = |extra: &[&str]| {
        let mut cmd = md();
        cmd.args(["--input", input.to_str().unwrap(), "--now", "2025-03-02T09:00:00Z"]).args(extra);
        let out = cmd.assert().success().get_output().stdout.clone();
        let v: Value = serde_json::from_slice(&out).unwrap();
        v["matches"][0]["phase"].as_str().unwrap().to_string()
    };
    assert_eq!(phase(&[]), "vote");
    assert_eq!(phase(&["--vote-hours", "12"]), "announce");
}

#[test]
fn validate_only_writes_nothing_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bundle(&dir, &bundle());
    md().args(["--input", input.to_str().unwrap(), "--validate-only"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("validate-only"));
}

#[test]
fn out_flag_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bundle(&dir, &bundle());
    let out = dir.path().join("report.json");

    md().args([
        "--input",
        input.to_str().unwrap(),
        "--now",
        "2025-03-10T00:00:00Z",
        "--out",
        out.to_str().unwrap(),
        "--quiet",
    ])
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

    let report: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(report["matches"].as_array().unwrap().len(), 1);
}

#[test]
fn missing_input_is_a_validation_error() {
    md().args(["--input", "no/such/season.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn url_input_is_rejected() {
    md().args(["--input", "https://example.com/season.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no scheme"));
}

#[test]
fn malformed_bundle_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bundle(&dir, &json!({"matches": [{"scheduled_at": "2025-03-01T10:00:00Z"}]}));
    md().args(["--input", input.to_str().unwrap(), "--now", "2025-03-10T00:00:00Z"])
        .assert()
        .code(2);

    let bad = dir.path().join("broken.json");
    fs::write(&bad, b"{ not json").unwrap();
    md().args(["--input", bad.to_str().unwrap(), "--validate-only"]).assert().code(2);
}

#[test]
fn bad_params_override_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_bundle(&dir, &bundle());
    md().args(["--input", input.to_str().unwrap(), "--utc-offset", "-5000", "--validate-only"])
        .assert()
        .code(2);
}
