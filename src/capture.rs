//! Capture adapters: turning external inputs into raw captures.
//!
//! The inspection core is agnostic to where queries come from. These
//! adapters cover the supported origins: application log files with
//! `SQL: <query>` lines, JSON-lines dumps written by request middleware,
//! and statements passed inline on the command line. Adapters stamp
//! missing timestamps with the current time; the core itself never reads
//! the clock.

use std::{fs::read_to_string, sync::LazyLock};

use chrono::Utc;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    error::{AppResult, file_read_error},
    record::{RawCapture, statement_kind}
};

/// Duration assigned to log-sourced captures, which carry no timing
const LOG_DEFAULT_DURATION: f64 = 0.01;

static SQL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SQL:\s*(.+)").expect("valid regex"));

/// Parse `SQL: <query>` lines from log file content.
///
/// Lines without the prefix are ignored; lines whose statement kind cannot
/// be determined are skipped with a warning, never fatal.
pub fn parse_log(content: &str) -> Vec<RawCapture> {
    let mut captures = Vec::new();
    for line in content.lines() {
        let Some(caps) = SQL_LINE.captures(line) else {
            continue;
        };
        let sql = caps[1].trim();
        if statement_kind(sql).is_none() {
            warn!(sql, "skipping invalid SQL in log line");
            continue;
        }
        captures.push(
            RawCapture::new(sql, LOG_DEFAULT_DURATION).with_timestamp(Utc::now())
        );
    }
    if captures.is_empty() {
        info!("no valid SQL queries found in log input");
    }
    captures
}

/// Fetch SQL queries from a log file
pub fn from_log_file(path: &str) -> AppResult<Vec<RawCapture>> {
    let content = read_to_string(path).map_err(|e| file_read_error(path, e))?;
    Ok(parse_log(&content))
}

/// Parse a JSON-lines middleware dump of raw captures.
///
/// Each non-empty line is one JSON object with `sql`, `duration` and
/// optional `call_site`/`timestamp` fields. Unreadable lines are skipped
/// with a warning.
pub fn parse_json_lines(content: &str) -> Vec<RawCapture> {
    let mut captures = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawCapture>(line) {
            Ok(mut capture) => {
                if capture.timestamp.is_none() {
                    capture.timestamp = Some(Utc::now());
                }
                captures.push(capture);
            }
            Err(err) => {
                warn!(line = number + 1, error = %err, "skipping unreadable capture line");
            }
        }
    }
    captures
}

/// Fetch captures from a JSON-lines file
pub fn from_json_file(path: &str) -> AppResult<Vec<RawCapture>> {
    let content = read_to_string(path).map_err(|e| file_read_error(path, e))?;
    Ok(parse_json_lines(&content))
}

/// Wrap SQL statements supplied inline on the command line
pub fn from_sql_strings(queries: &[String]) -> Vec<RawCapture> {
    queries
        .iter()
        .map(|sql| RawCapture::new(sql.trim(), LOG_DEFAULT_DURATION).with_timestamp(Utc::now()))
        .collect()
}
