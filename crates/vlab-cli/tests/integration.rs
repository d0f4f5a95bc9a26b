#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn vlab(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vlab").unwrap();
    cmd.current_dir(dir.path()).env_remove("VLAB_CONFIG");
    cmd
}

fn write_protocol(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

const MIXED_PROTOCOL: &str = r#"{
  "activity_title": "Mixed",
  "protocol_steps": [
    {"id": "good", "validation_rule": {"action": "rinse", "with": "water"}},
    {"id": "bad", "validation_rule": {"action": "centrifuge"}}
  ]
}"#;

// ---------------------------------------------------------------------------
// vlab protocol check
// ---------------------------------------------------------------------------

#[test]
fn check_builtin_protocol_succeeds() {
    let dir = TempDir::new().unwrap();
    vlab(&dir)
        .args(["protocol", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Titulacao de NaOH com HCl"))
        .stdout(predicate::str::contains("transfer_volume"));
}

#[test]
fn check_reports_skipped_steps_and_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_protocol(&dir, "mixed.json", MIXED_PROTOCOL);
    vlab(&dir)
        .args(["protocol", "check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("skipped: unknown rule type: centrifuge"))
        .stderr(predicate::str::contains("1 step(s) could not be compiled"));
}

#[test]
fn check_json_output() {
    let dir = TempDir::new().unwrap();
    let output = vlab(&dir)
        .args(["--json", "protocol", "check"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["compiled"], serde_json::json!(["step1", "step2"]));
    assert_eq!(json["skipped"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// vlab protocol evaluate
// ---------------------------------------------------------------------------

#[test]
fn evaluate_passing_action() {
    let dir = TempDir::new().unwrap();
    vlab(&dir)
        .args([
            "protocol",
            "evaluate",
            "--step",
            "step2",
            "--action",
            r#"{"action":"transfer_volume","equipment":"pipette_25ml","volume_ml":25.5}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("step2: pass"));
}

#[test]
fn evaluate_failing_action() {
    let dir = TempDir::new().unwrap();
    vlab(&dir)
        .args([
            "protocol",
            "evaluate",
            "--step",
            "step1",
            "--action",
            r#"{"action":"rinse","with":"water"}"#,
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("step1: fail"));
}

#[test]
fn evaluate_rejects_invalid_action_json() {
    let dir = TempDir::new().unwrap();
    vlab(&dir)
        .args(["protocol", "evaluate", "--step", "step1", "--action", "{oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--action is not valid JSON"));
}

// ---------------------------------------------------------------------------
// vlab protocol export
// ---------------------------------------------------------------------------

#[test]
fn export_writes_loadable_protocol() {
    let dir = TempDir::new().unwrap();
    vlab(&dir)
        .args(["protocol", "export", "out/protocol.json"])
        .assert()
        .success();
    let path = dir.path().join("out/protocol.json");
    vlab(&dir)
        .args(["protocol", "check", path.to_str().unwrap()])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// vlab config
// ---------------------------------------------------------------------------

#[test]
fn config_show_uses_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    vlab(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in defaults"))
        .stdout(predicate::str::contains("report_base_url"));
}

#[test]
fn config_init_then_validate() {
    let dir = TempDir::new().unwrap();
    vlab(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("vlab.yaml").exists());
    vlab(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    vlab(&dir).args(["config", "init"]).assert().success();
    vlab(&dir).args(["config", "init"]).assert().failure();
}

#[test]
fn config_validate_flags_missing_protocol() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("vlab.yaml"), "protocol_path: missing.json\n").unwrap();
    vlab(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] protocol_path"));
}

#[test]
fn configured_protocol_is_used_by_check() {
    let dir = TempDir::new().unwrap();
    write_protocol(&dir, "mixed.json", MIXED_PROTOCOL);
    std::fs::write(dir.path().join("vlab.yaml"), "protocol_path: mixed.json\n").unwrap();
    vlab(&dir)
        .args(["protocol", "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Mixed"));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    vlab(&dir)
        .args(["--config", "nope.yaml", "protocol", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

// ---------------------------------------------------------------------------
// vlab submit
// ---------------------------------------------------------------------------

#[test]
fn submit_reports_unreachable_provider() {
    let dir = TempDir::new().unwrap();
    vlab(&dir)
        .args([
            "submit",
            "--url",
            "http://127.0.0.1:1/analytics_url",
            "--activity",
            "A1",
            "--student",
            "stu123",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not reach"));
}
