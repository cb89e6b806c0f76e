//! End-to-end runs of the binary against generated reference images.

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::fs;

use assert_cmd::Command;
use decode_probe_core::Argb;
use decode_probe_test_support::ReferenceImageBuilder;
use predicates::prelude::*;
use serde_json::Value;

fn probe() -> Command {
    Command::cargo_bin("decode-probe").unwrap()
}

#[test]
fn test_matching_reference_succeeds() {
    let (_dir, path) = ReferenceImageBuilder::new().write_temp("reference.png").unwrap();

    probe()
        .args(["2", "2", "false", "--image"])
        .arg(&path)
        .assert()
        .code(0)
        .stdout(
            predicate::str::contains("Starting")
                .and(predicate::str::contains("Loop 1"))
                .and(predicate::str::contains("\tsuccess (1, 1) -> true"))
                .and(predicate::str::contains("Now a serial test with 10 iterations"))
                .and(predicate::str::contains("\tsuccess (9): true"))
                .and(predicate::str::contains("All 14 probes matched")),
        );
}

#[test]
fn test_serialize_flag_is_case_insensitive() {
    let (_dir, path) = ReferenceImageBuilder::new().write_temp("reference.png").unwrap();

    probe()
        .args(["3", "1", "TRUE", "-q", "--image"])
        .arg(&path)
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_wrong_pixel_fails_with_diagnostics() {
    let (_dir, path) = ReferenceImageBuilder::new()
        .corner(Argb(0xff20_4060))
        .write_temp("reference.png")
        .unwrap();

    probe()
        .args(["2", "1", "false", "--image"])
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("-> false"))
        .stderr(predicate::str::contains(
            "!!! pixel(0,0) = ff204060. Expected: ff010103",
        ));
}

#[test]
fn test_missing_reference_fails_every_probe() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.jpg");

    probe()
        .args(["2", "1", "true", "--image"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("!!! Error reading").and(predicate::str::contains("missing.jpg")));
}

#[test]
fn test_zero_iterations_runs_serial_phase_only() {
    let (_dir, path) = ReferenceImageBuilder::new().write_temp("reference.png").unwrap();

    probe()
        .args(["4", "0", "false", "--image"])
        .arg(&path)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Loop").not().and(predicate::str::contains("All 10 probes matched")));
}

#[test]
fn test_json_report() {
    let (_dir, path) = ReferenceImageBuilder::new().write_temp("reference.png").unwrap();

    let output = probe()
        .args(["2", "3", "false", "--format", "json", "--image"])
        .arg(&path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout is one JSON document");
    assert_eq!(report["probes"], 16);
    assert_eq!(report["failures"], 0);
    assert_eq!(report["success"], true);
    assert_eq!(report["settings"]["workers"], 2);
    assert_eq!(report["settings"]["rounds"], 3);
    assert!(report["failing"].as_array().unwrap().is_empty());
    // Progress lines moved to stderr.
    assert!(String::from_utf8_lossy(&output.stderr).contains("Loop 2"));
}

#[test]
fn test_project_config_supplies_reference() {
    let (dir, path) = ReferenceImageBuilder::new().write_temp("reference.png").unwrap();
    fs::write(
        dir.path().join(".decode-probe.toml"),
        format!(
            "[reference]\npath = '{}'\n\n[output]\nformat = 'json'\n",
            path.display()
        ),
    )
    .unwrap();

    let output = probe()
        .current_dir(dir.path())
        .args(["1", "1", "false"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["reference"], path.display().to_string());
}

#[test]
fn test_relative_config_reference_follows_config_file() {
    let (dir, path) = ReferenceImageBuilder::new().write_temp("reference.png").unwrap();
    fs::write(
        dir.path().join(".decode-probe.toml"),
        "[reference]\npath = 'reference.png'\n\n[output]\nformat = 'json'\n",
    )
    .unwrap();
    let nested = dir.path().join("nested").join("deeper");
    fs::create_dir_all(&nested).unwrap();

    let output = probe()
        .current_dir(&nested)
        .args(["1", "1", "false"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["reference"], path.display().to_string());
    assert_eq!(report["success"], true);
}
