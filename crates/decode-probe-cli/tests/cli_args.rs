//! CLI argument validation tests.
//!
//! Malformed invocations must exit with the usage code before any decode runs.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use assert_cmd::Command;
use predicates::prelude::*;

fn probe() -> Command {
    Command::cargo_bin("decode-probe").unwrap()
}

#[test]
fn test_missing_arguments_is_usage_error() {
    probe()
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Wrong invocation").and(predicate::str::contains("N_THREADS")));
}

#[test]
fn test_non_numeric_thread_count_rejected() {
    probe()
        .args(["five", "10", "false"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Starting").not())
        .stderr(predicate::str::contains("not a valid thread count"));
}

#[test]
fn test_zero_threads_rejected() {
    probe()
        .args(["0", "10", "false"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least one thread"));
}

#[test]
fn test_negative_iterations_rejected() {
    probe().args(["2", "-1", "false"]).assert().code(2);
}

#[test]
fn test_invalid_serialize_flag_rejected() {
    probe()
        .args(["2", "3", "maybe"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("neither 'true' nor 'false'"));
}

#[test]
fn test_invalid_format_rejected() {
    probe()
        .args(["2", "3", "false", "--format", "xml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("text").or(predicate::str::contains("json")));
}

#[test]
fn test_help_succeeds() {
    probe()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("N_ITERATIONS")
                .and(predicate::str::contains("EXAMPLES"))
                .and(predicate::str::contains("decode-probe 5 10 true")),
        );
}
