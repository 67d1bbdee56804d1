use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PUMP: &str = r#"{
    "$dtId": "P1",
    "$metadata": {"$model": "dtmi:dtwin:equipment:Pump;2"},
    "manufacturer": "Acme",
    "ratedFlow": 12.5,
    "mode": "Auto",
    "flowRate": null,
    "unknownKey": true
}"#;

/// Runs `dtwin` inside `dir` with a clean environment for its own settings.
fn dtwin(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("dtwin");
    cmd.current_dir(dir).env_remove("RUST_LOG").env_remove("DTWIN__ENGINE__PRETTY");
    cmd
}

fn workspace_with(file: &str, content: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(file), content).unwrap();
    dir
}

#[test]
fn list_prints_every_model_id() {
    let dir = tempfile::tempdir().unwrap();

    dtwin(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("dtmi:dtwin:facility:Campus;1"))
        .stdout(predicate::str::contains("dtmi:dtwin:equipment:Pump;2\tPump"));
}

#[test]
fn models_are_written_one_file_per_type() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("schemas");

    dtwin(dir.path())
        .args(["models", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Space.json"));

    let space: Value = serde_json::from_str(&fs::read_to_string(out.join("Space.json")).unwrap()).unwrap();
    assert_eq!(space["@id"], "dtmi:dtwin:facility:Space;1");
    assert_eq!(fs::read_dir(&out).unwrap().count(), 8);
}

#[test]
fn convert_prints_the_canonical_document() {
    let dir = workspace_with("pump.json", PUMP);

    let output = dtwin(dir.path()).args(["convert", "pump.json"]).output().unwrap();
    assert!(output.status.success());

    let document: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["$dtId"], "P1");
    assert_eq!(document["mode"], 10);
    assert_eq!(document["ratedFlow"], 12.5);
    assert!(document.get("flowRate").is_none());
    assert!(document.get("unknownKey").is_none());
}

#[test]
fn contents_prints_the_upload_shape() {
    let dir = workspace_with("pump.json", PUMP);

    let output = dtwin(dir.path()).args(["contents", "pump.json"]).output().unwrap();
    assert!(output.status.success());

    let basic: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(basic["$metadata"]["$model"], "dtmi:dtwin:equipment:Pump;2");
    assert_eq!(basic["manufacturer"], "Acme");
    assert!(basic.get("flowRate").is_none());
}

#[test]
fn config_file_enables_pretty_output() {
    let dir = workspace_with("pump.json", PUMP);
    fs::write(dir.path().join("dtwin.toml"), "[engine]\npretty = true\n").unwrap();

    dtwin(dir.path())
        .args(["convert", "pump.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"$dtId\": \"P1\""));
}

#[test]
fn environment_overrides_the_config_file() {
    let dir = workspace_with("pump.json", PUMP);
    let config = dir.path().join("custom.toml");
    fs::write(&config, "[engine]\npretty = true\n").unwrap();

    dtwin(dir.path())
        .args(["convert", "pump.json", "--config"])
        .arg(&config)
        .env("DTWIN__ENGINE__PRETTY", "false")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\"$dtId\":\"P1\""));
}

#[test]
fn unregistered_model_fails() {
    let dir = workspace_with("other.json", r#"{"$dtId":"X","$metadata":{"$model":"dtmi:other:Thing;1"}}"#);

    dtwin(dir.path())
        .args(["convert", "other.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dtmi:other:Thing;1 is not registered"));
}

#[test]
fn missing_file_fails_with_its_path() {
    let dir = tempfile::tempdir().unwrap();

    dtwin(dir.path())
        .args(["contents", "absent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn invalid_setpoint_is_rejected() {
    let dir = workspace_with(
        "thermostat.json",
        r#"{"$dtId":"T1","$metadata":{"$model":"dtmi:dtwin:equipment:Thermostat;1"},"setpoint":90}"#,
    );

    dtwin(dir.path())
        .args(["convert", "thermostat.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation failed"));
}
