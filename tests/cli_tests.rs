//! Integration tests for the query-sheriff binary.

use std::io::Write;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn cmd() -> Command {
    cargo_bin_cmd!("query-sheriff")
}

#[test]
fn test_no_arguments_shows_usage_error() {
    cmd().assert().failure();
}

#[test]
fn test_inline_sql_clean_batch() {
    cmd()
        .args(["inspect", "SELECT id FROM users WHERE id = 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No inefficiencies detected."));
}

#[test]
fn test_inline_sql_cartesian_product_exits_2() {
    cmd()
        .args(["inspect", "SELECT a.x, b.y FROM a JOIN b"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("CARTESIAN_PRODUCT"));
}

#[test]
fn test_inline_sql_n_plus_one_exits_1() {
    cmd()
        .args([
            "inspect",
            "SELECT * FROM users WHERE id = 1",
            "SELECT * FROM users WHERE id = 2",
            "SELECT * FROM users WHERE id = 3"
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("N_PLUS_ONE (3 occurrences)"));
}

#[test]
fn test_offset_threshold_flag_override() {
    cmd()
        .args([
            "inspect",
            "--offset-threshold",
            "100",
            "SELECT * FROM posts LIMIT 20 OFFSET 300"
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("LARGE_OFFSET"));
}

#[test]
fn test_log_file_input() {
    let mut log = NamedTempFile::new().unwrap();
    writeln!(log, "[DEBUG] SQL: SELECT * FROM users WHERE id = 1").unwrap();
    writeln!(log, "[DEBUG] SQL: SELECT * FROM users WHERE id = 2").unwrap();
    writeln!(log, "[INFO] request finished").unwrap();

    cmd()
        .args(["inspect", "--log", log.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("N_PLUS_ONE"));
}

#[test]
fn test_log_file_missing_exits_2() {
    cmd()
        .args(["inspect", "--log", "/nonexistent/app.log"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_captures_file_input() {
    let mut captures = NamedTempFile::new().unwrap();
    writeln!(
        captures,
        r#"{{"sql": "SELECT * FROM big_table", "duration": 2.5, "call_site": "app/views.py:10"}}"#
    )
    .unwrap();

    cmd()
        .args(["inspect", "--captures", captures.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("SLOW_QUERY"));
}

#[test]
fn test_captures_from_stdin() {
    cmd()
        .args(["inspect", "--captures", "-"])
        .write_stdin(r#"{"sql": "SELECT * FROM big_table", "duration": 2.5}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("SLOW_QUERY"));
}

#[test]
fn test_json_output_format() {
    cmd()
        .args(["inspect", "-f", "json", "SELECT a.x FROM a JOIN b"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"records_analyzed\": 1"));
}

#[test]
fn test_no_input_exits_2() {
    cmd()
        .args(["inspect"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no input"));
}

#[test]
fn test_env_threshold_override() {
    cmd()
        .env("QUERY_SHERIFF_OFFSET_THRESHOLD", "100")
        .args(["inspect", "SELECT * FROM posts LIMIT 20 OFFSET 300"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("LARGE_OFFSET"));
}

#[test]
fn test_invalid_env_threshold_exits_2() {
    cmd()
        .env("QUERY_SHERIFF_OFFSET_THRESHOLD", "lots")
        .args(["inspect", "SELECT 1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_local_config_file_sets_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".query-sheriff.toml"),
        "[thresholds]\noffset_threshold = 100\n"
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["inspect", "SELECT * FROM posts LIMIT 20 OFFSET 300"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("LARGE_OFFSET"));
}

#[test]
fn test_env_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".query-sheriff.toml"),
        "[thresholds]\noffset_threshold = 1000\n"
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .env("QUERY_SHERIFF_OFFSET_THRESHOLD", "100")
        .args(["inspect", "SELECT * FROM posts LIMIT 20 OFFSET 300"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("LARGE_OFFSET"));
}
