// tests/cli_test.rs

//! CLI tests for aptlyctl
//!
//! Every command runs against a nonexistent aptly binary with an isolated
//! config search path, so only dry-run output and fail-closed probes are
//! observable.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for running aptlyctl with no config file in reach
fn aptlyctl(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("aptlyctl").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("xdg"))
        .env_remove("APTLYCTL_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--aptly-bin")
        .arg(home.path().join("no-such-aptly"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    aptlyctl(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("multiarch"))
        .stdout(predicate::str::contains("publish"));
}

#[test]
fn dry_run_repo_create_prints_command() {
    let home = TempDir::new().unwrap();
    aptlyctl(&home)
        .args(["--dry-run", "repo", "create", "myapp-amd64-main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run] create repo: aptly repo create"))
        .stdout(predicate::str::contains("-distribution=myapp"))
        .stdout(predicate::str::ends_with("myapp-amd64-main\n"));
}

#[test]
fn malformed_repo_name_fails() {
    let home = TempDir::new().unwrap();
    aptlyctl(&home)
        .args(["-n", "repo", "create", "myapp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("myapp"))
        .stdout(predicate::str::contains("[dry-run]").not());
}

#[test]
fn unreachable_aptly_reports_missing_repo() {
    let home = TempDir::new().unwrap();
    aptlyctl(&home)
        .args(["repo", "drop", "myapp-amd64-main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Repository 'myapp-amd64-main' doesn't exist"));
}

#[test]
fn listing_without_aptly_is_empty() {
    let home = TempDir::new().unwrap();
    aptlyctl(&home)
        .args(["snapshot", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn explicit_missing_config_fails() {
    let home = TempDir::new().unwrap();
    aptlyctl(&home)
        .args(["--config"])
        .arg(home.path().join("absent.toml"))
        .args(["repo", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn config_file_enables_dry_run() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("aptlyctl.toml");
    std::fs::write(&config, "dry_run = true\n").unwrap();

    aptlyctl(&home)
        .env("APTLYCTL_CONFIG", &config)
        .args(["snapshot", "merge", "myapp-empty"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[dry-run] create empty snapshot: aptly snapshot create myapp-empty empty",
        ));
}

#[test]
fn completions_for_bash() {
    let home = TempDir::new().unwrap();
    aptlyctl(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aptlyctl"));
}
