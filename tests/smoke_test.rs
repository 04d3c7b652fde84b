//! Smoke tests for the taskbook CLI.
//!
//! These tests verify basic CLI functionality:
//! - `tb --version` outputs version info
//! - `tb --help` lists the options
//! - `tb` with closed stdin shows the menu and exits cleanly

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

/// Get a Command for the tb binary.
fn tb() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tb"))
}

#[test]
fn test_version_flag() {
    tb().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tb"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    tb().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--data-file"))
        .stdout(predicate::str::contains("--sync-url"))
        .stdout(predicate::str::contains("--id-policy"));
}

#[test]
fn test_unknown_id_policy_is_rejected() {
    tb().args(["--id-policy", "random"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("length"));
}

#[test]
fn test_empty_stdin_shows_menu_and_exits() {
    let env = TestEnv::new();

    env.tb()
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("1. ADD - Add a new task"))
        .stdout(predicate::str::contains("9. EXIT - Exit the program"))
        .stdout(predicate::str::contains("Exiting..."));
}

#[test]
fn test_logs_stay_off_stdout() {
    let env = TestEnv::new();

    env.tb()
        .env("RUST_LOG", "taskbook=debug")
        .write_stdin("9\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("DEBUG").not())
        .stderr(predicate::str::contains("saved tasks"));
}
