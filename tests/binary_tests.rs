//! Integration tests for the sql-safety-guard binary.

use std::io::Write;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn cmd() -> Command {
    cargo_bin_cmd!("sql-safety-guard")
}

#[test]
fn check_clean_query_succeeds() {
    let mut sql = NamedTempFile::new().unwrap();
    writeln!(sql, "SELECT id FROM users WHERE id = 1 ORDER BY id LIMIT 10").unwrap();

    cmd()
        .args(["check", "--sql", sql.path().to_str().unwrap(), "--no-color"])
        .assert()
        .success();
}

#[test]
fn check_reports_violation_for_select_star() {
    let mut sql = NamedTempFile::new().unwrap();
    writeln!(sql, "SELECT * FROM orders").unwrap();

    cmd()
        .args(["check", "--sql", sql.path().to_str().unwrap(), "--no-color"])
        .assert()
        .stdout(predicate::str::contains("OP002"));
}

#[test]
fn check_missing_file_fails() {
    cmd()
        .args(["check", "--sql", "/nonexistent/query.sql"])
        .assert()
        .failure();
}

#[test]
fn check_json_output_is_valid_json() {
    let mut sql = NamedTempFile::new().unwrap();
    writeln!(sql, "SELECT id FROM items LIMIT 10").unwrap();

    cmd()
        .args([
            "check",
            "--sql",
            sql.path().to_str().unwrap(),
            "--output-format",
            "json",
            "--no-color"
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("{"));
}

#[test]
fn check_warns_on_stacked_queries_under_default_config() {
    let mut sql = NamedTempFile::new().unwrap();
    writeln!(sql, "SELECT * FROM users; DROP TABLE users;").unwrap();

    cmd()
        .args(["check", "--sql", sql.path().to_str().unwrap(), "--no-color"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("SEC006").or(predicate::str::contains("SEC010")));
}

#[test]
fn check_mysql_dialect_is_accepted() {
    let mut sql = NamedTempFile::new().unwrap();
    writeln!(sql, "SELECT id FROM t LIMIT 10").unwrap();

    cmd()
        .args([
            "check",
            "--sql",
            sql.path().to_str().unwrap(),
            "--dialect",
            "mysql",
            "--no-color"
        ])
        .assert()
        .success();
}

#[test]
fn check_reads_from_stdin() {
    cmd()
        .args(["check", "--sql", "-", "--no-color"])
        .write_stdin("SELECT id FROM users WHERE id = 1 LIMIT 5\n")
        .assert()
        .success();
}

#[test]
fn help_succeeds() {
    cmd().arg("--help").assert().success();
}

#[test]
fn version_succeeds() {
    cmd().arg("--version").assert().success();
}
