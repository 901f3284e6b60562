//! CLI surface tests: argument handling, exit codes, error reporting.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("e2e")
        .join("fixtures")
}

fn craftc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_craftc"))
}

#[test]
fn test_help() {
    craftc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("craftc"));
}

#[test]
fn test_version() {
    craftc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("craftc"));
}

#[test]
fn test_missing_arguments_fail() {
    craftc().assert().failure();
    craftc().arg("only-source.craft").assert().failure();
}

#[test]
fn test_unreadable_source_fails() {
    let temp = TempDir::new().expect("temp dir");
    craftc()
        .arg(temp.path().join("does-not-exist.craft"))
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn test_parse_error_exits_nonzero() {
    let temp = TempDir::new().expect("temp dir");
    craftc()
        .arg(fixtures_dir().join("bad.craft"))
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse error"));
}

#[test]
fn test_compile_error_exits_nonzero() {
    let temp = TempDir::new().expect("temp dir");
    craftc()
        .arg(fixtures_dir().join("undefined.craft"))
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("compile error"));
}
