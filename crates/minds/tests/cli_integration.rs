//! CLI integration tests for the Minds command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - Invalid inputs are rejected with appropriate messages
//!
//! Note: These tests do not contact the Minds platform - they test CLI
//! parsing, help output and failures that happen before any request.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a command for the minds binary with no credentials in the environment.
fn minds() -> Command {
    let mut cmd = Command::cargo_bin("minds").unwrap();
    cmd.env_remove("MINDS_API_KEY")
        .env_remove("MINDS_BASE_URL")
        .env_remove("MINDS_PROJECT");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    minds()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Minds"))
        .stdout(predicate::str::contains("knowledge bases"));
}

#[test]
fn test_version_displays() {
    minds()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("minds"));
}

#[test]
fn test_help_lists_subcommands() {
    minds()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("datasources"))
        .stdout(predicate::str::contains("kb"))
        .stdout(predicate::str::contains("minds"))
        .stdout(predicate::str::contains("ask"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Flag Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_verbose_flag_accepted() {
    minds().args(["--verbose", "--help"]).assert().success();
}

#[test]
fn test_json_flag_accepted() {
    minds().args(["--json", "--help"]).assert().success();
}

#[test]
fn test_connection_flags_accepted() {
    minds()
        .args([
            "--api-key",
            "secret",
            "--base-url",
            "http://localhost:9999",
            "--project",
            "other",
            "--help",
        ])
        .assert()
        .success();
}

#[test]
fn test_missing_api_key_fails_before_any_request() {
    minds()
        .args(["minds", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MINDS_API_KEY"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommand Help Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_datasources_help() {
    minds()
        .args(["datasources", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("drop"));
}

#[test]
fn test_datasources_create_help_lists_modes() {
    minds()
        .args(["datasources", "create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--engine"))
        .stdout(predicate::str::contains("replace"))
        .stdout(predicate::str::contains("update"));
}

#[test]
fn test_kb_help() {
    minds()
        .args(["kb", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("insert-urls"))
        .stdout(predicate::str::contains("insert-files"))
        .stdout(predicate::str::contains("insert-query"));
}

#[test]
fn test_minds_help() {
    minds()
        .args(["minds", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("add-datasource"))
        .stdout(predicate::str::contains("remove-datasource"))
        .stdout(predicate::str::contains("add-kb"))
        .stdout(predicate::str::contains("remove-kb"));
}

#[test]
fn test_ask_help() {
    minds()
        .args(["ask", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("question"))
        .stdout(predicate::str::contains("--stream"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument Validation Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ask_requires_message() {
    minds()
        .args(["ask", "my_mind"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_datasources_create_requires_engine() {
    minds()
        .args(["datasources", "create", "my_ds", "--description", "d"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--engine"));
}

#[test]
fn test_invalid_mode_rejected() {
    minds()
        .args([
            "datasources",
            "create",
            "my_ds",
            "-e",
            "postgres",
            "-d",
            "d",
            "--mode",
            "upsert",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_chunk_size_requires_preprocessing() {
    minds()
        .args(["kb", "insert-urls", "my_kb", "https://example.com", "--chunk-size", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--preprocessing"));
}

#[test]
fn test_invalid_mind_name_rejected_locally() {
    minds()
        .args([
            "--api-key",
            "secret",
            "--base-url",
            "http://127.0.0.1:1",
            "minds",
            "get",
            "not-a-valid-name",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-a-valid-name"));
}

#[test]
fn test_verbose_logs_client_setup_to_stderr() {
    minds()
        .env_remove("RUST_LOG")
        .args([
            "--verbose",
            "--api-key",
            "secret",
            "--base-url",
            "http://127.0.0.1:1",
            "datasources",
            "list",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("client ready").not())
        .stderr(predicate::str::contains("client ready"));
}

#[test]
fn test_unknown_subcommand() {
    minds()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
