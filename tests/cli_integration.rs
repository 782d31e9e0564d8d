//! Integration tests for CLI commands.
//!
//! These tests verify that CLI commands work correctly without requiring
//! a downloaded model or a display.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the talskrift binary
fn talskrift() -> Command {
    Command::cargo_bin("talskrift").unwrap()
}

#[test]
fn test_help_command() {
    talskrift()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch transcription"))
        .stdout(predicate::str::contains("gui"))
        .stdout(predicate::str::contains("transcribe"))
        .stdout(predicate::str::contains("model"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_command() {
    talskrift()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("talskrift"));
}

#[test]
fn test_model_list() {
    talskrift()
        .args(["model", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kb-whisper-tiny"))
        .stdout(predicate::str::contains("kb-whisper-small"))
        .stdout(predicate::str::contains("large-v3"));
}

#[test]
fn test_model_remove_unknown() {
    talskrift()
        .args(["model", "remove", "nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown model"));
}

#[test]
fn test_config_show() {
    // Works even without an existing config (uses defaults)
    talskrift()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[model]"))
        .stdout(predicate::str::contains("language"));
}

#[test]
fn test_transcribe_requires_files() {
    talskrift().arg("transcribe").assert().failure();
}

#[test]
fn test_transcribe_rejects_bad_format() {
    talskrift()
        .args(["transcribe", "tal.wav", "--format", "docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}

#[test]
fn test_transcribe_missing_file_fails() {
    // Fails either on a missing model or on the missing file; either way
    // the exit code is non-zero and nothing is written
    talskrift()
        .args(["transcribe", "/nonexistent/tal.wav"])
        .assert()
        .failure();
}

#[test]
fn test_transcribe_help() {
    talskrift()
        .args(["transcribe", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--language"));
}
