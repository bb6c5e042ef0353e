//! Integration tests for CLI commands

#![allow(deprecated)]

use assert_cmd::{assert::OutputAssertExt, cargo::CommandCargoExt};
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

/// `mark` with every config/data/state directory inside `home`
fn mark(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mark").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_STATE_HOME", home.path().join("state"))
        .env_remove("MARK_SERVICE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    mark(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("shortcuts"));
}

#[test]
fn test_config_path_is_under_config_home() {
    let home = TempDir::new().unwrap();
    mark(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains("mark-assistant"));
}

#[test]
fn test_config_show_defaults() {
    let home = TempDir::new().unwrap();
    mark(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url = \"http://127.0.0.1:8000\""))
        .stdout(predicate::str::contains("debounce_ms = 300"));
}

#[test]
fn test_url_flag_overrides_config() {
    let home = TempDir::new().unwrap();
    mark(&home)
        .args(["--url", "http://answers.internal:9000", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://answers.internal:9000"));
}

#[test]
fn test_shortcuts_list_empty() {
    let home = TempDir::new().unwrap();
    mark(&home)
        .args(["shortcuts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved shortcuts."));
}

#[test]
fn test_shortcuts_delete_unknown() {
    let home = TempDir::new().unwrap();
    mark(&home)
        .args(["shortcuts", "delete", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved shortcut with id 42"));
}

#[test]
fn test_ask_requires_identity() {
    let home = TempDir::new().unwrap();
    mark(&home)
        .args(["ask", "Sales today"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Choose an identity"));
}

#[test]
fn test_ask_rejects_unknown_user() {
    let home = TempDir::new().unwrap();
    mark(&home)
        .args(["ask", "Sales today", "--user", "auditor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
}

#[test]
fn test_ask_unreachable_service_reports_connection_error() {
    let home = TempDir::new().unwrap();
    mark(&home)
        .args([
            "--url",
            "http://127.0.0.1:9",
            "ask",
            "Sales today",
            "--role",
            "MANAGER",
            "--branch",
            "1",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Connection error. Please check system status.",
        ))
        .stderr(predicate::str::contains("could not be reached"));
}

#[test]
fn test_shortcuts_run_unknown_id() {
    let home = TempDir::new().unwrap();
    mark(&home)
        .args(["shortcuts", "run", "42", "--user", "admin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No saved shortcut with id 42"));
}

#[test]
fn test_shortcuts_run_sends_saved_query() {
    let home = TempDir::new().unwrap();
    let data_dir = home.path().join("data").join("mark-assistant");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(
        data_dir.join("savedQueries.json"),
        r#"[{"id": 7, "label": "Daily", "query": "Sales today, all branches"}]"#,
    )
    .unwrap();

    mark(&home)
        .args(["--url", "http://127.0.0.1:9", "shortcuts", "run", "7", "--user", "owner"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Connection error. Please check system status.",
        ));
}
