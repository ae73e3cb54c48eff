//! End-to-end CLI tests for the stitcher binary.

use assert_cmd::Command;
use predicates::prelude::*;

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("stitcher").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download and combine"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("stitcher").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stitcher"));
}

/// Test that missing positional arguments cause non-zero exit with usage text.
#[test]
fn test_binary_missing_arguments_returns_error() {
    let mut cmd = Command::cargo_bin("stitcher").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("stitcher").unwrap();
    cmd.args(["http://h/p/list.m3u8", "movie", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that out-of-range concurrency is rejected by argument validation.
#[test]
fn test_binary_rejects_zero_concurrency() {
    let mut cmd = Command::cargo_bin("stitcher").unwrap();
    cmd.args(["http://h/p/list.m3u8", "movie", "-c", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

/// Test that an invalid playlist URL fails fast with a diagnostic and
/// non-zero exit (no network involved).
#[test]
fn test_binary_invalid_url_fails_with_diagnostic() {
    let scratch = tempfile::TempDir::new().unwrap();
    let output_dir = scratch.path().join("out");

    let mut cmd = Command::cargo_bin("stitcher").unwrap();
    cmd.args(["not a url", "movie", "-q", "-o"])
        .arg(&output_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid playlist URL"));
}
