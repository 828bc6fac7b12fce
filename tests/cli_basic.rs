//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, and each subcommand
//! responds to `--help` with appropriate text.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `fundscan` binary.
fn fundscan() -> Command {
    Command::cargo_bin("fundscan").expect("binary 'fundscan' should be built")
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    fundscan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: fundscan"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("prompt"))
        .stdout(predicate::str::contains("debug"));
}

#[test]
fn version_flag_shows_semver() {
    fundscan()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^fundscan \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    fundscan()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: fundscan"));
}

#[test]
fn invalid_subcommand_fails() {
    fundscan()
        .arg("this-is-not-a-real-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn scan_help() {
    fundscan()
        .args(["scan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Find the best page for a fund"))
        .stdout(predicate::str::contains("<FILE>"))
        .stdout(predicate::str::contains("<FUND>"))
        .stdout(predicate::str::contains("--no-analyze"))
        .stdout(predicate::str::contains("--endpoint"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn prompt_help() {
    fundscan()
        .args(["prompt", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ready-to-paste analysis prompt"))
        .stdout(predicate::str::contains("<FILE>"));
}

#[test]
fn debug_help() {
    fundscan()
        .args(["debug", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("what text each page yields"))
        .stdout(predicate::str::contains("--pages"));
}

// ─── Subcommand argument validation ──────────────────────────────────────────

#[test]
fn scan_missing_fund_fails() {
    fundscan()
        .args(["scan", "report.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<FUND>"));
}

#[test]
fn scan_rejects_unknown_format() {
    fundscan()
        .args(["scan", "report.json", "Axis", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'yaml'"));
}

#[test]
fn relay_help() {
    Command::cargo_bin("fundscan-relay")
        .expect("binary 'fundscan-relay' should be built")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"));
}
