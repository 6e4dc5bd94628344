// The cargo_bin! macro requires build script setup that's overkill for simple tests.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../stldata/tests/fixtures/empire.txt")
}

fn stlgen() -> Command {
    Command::cargo_bin("stlgen").unwrap()
}

#[test]
fn test_help_flag() {
    stlgen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--seed"));
}

#[test]
fn test_generates_bundle() {
    stlgen()
        .arg(fixture())
        .args(["--seed", "12"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("authority"))
        .stdout(predicate::str::contains("species    species_"));
}

#[test]
fn test_seeded_runs_match() {
    let run = || {
        let output = stlgen()
            .arg(fixture())
            .args(["--seed", "99", "-n", "3"])
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    let first = run();
    assert_eq!(first.matches("# Empire").count(), 3);
    assert_eq!(first, run());
}

#[test]
fn test_missing_file_fails() {
    stlgen()
        .arg("/nonexistent/empire.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/empire.txt"));
}

#[test]
fn test_list_marks_disabled() {
    stlgen()
        .arg(fixture())
        .args(["--list", "--disable", "auth_hive_mind"])
        .assert()
        .success()
        .stdout(predicate::str::contains("authority:"))
        .stdout(predicate::str::contains("auth_hive_mind (disabled)"))
        .stdout(predicate::str::contains("species_rock"));
}

#[test]
fn test_dump_json() {
    let output = stlgen().arg(fixture()).arg("--dump-json").output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json.to_string().contains("ethic_gestalt_consciousness"));
}

#[test]
fn test_config_file_and_cache() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{ "max_attempts": 5, "seed": 3 }"#).unwrap();
    let cache = dir.path().join("properties.json");

    for _ in 0..2 {
        stlgen()
            .arg(fixture())
            .arg("--config")
            .arg(&config)
            .arg("--cache")
            .arg(&cache)
            .assert()
            .success()
            .stdout(predicate::str::contains("origin"));
    }
    assert!(cache.exists());
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{ "max_steps": 0 }"#).unwrap();
    stlgen()
        .arg(fixture())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_steps"));
}
