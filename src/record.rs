//! Query record normalization and signature derivation.
//!
//! Raw captures from the database layer arrive as loose `{sql, duration,
//! call_site, timestamp}` tuples. The normalizer turns each into an
//! immutable [`QueryRecord`] with a classified [`StatementKind`] and a
//! [`signature`] used to group structurally identical queries regardless of
//! literal parameter values.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppResult, malformed_query_error};

/// Call site placeholder when the capture layer has no source location
pub const UNKNOWN_CALL_SITE: &str = "Unknown";

/// Raw capture as delivered by middleware, log parsing, or the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCapture {
    pub sql:       String,
    /// Execution time in seconds
    pub duration:  f64,
    #[serde(default)]
    pub call_site: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>
}

impl RawCapture {
    pub fn new(sql: impl Into<String>, duration: f64) -> Self {
        Self {
            sql: sql.into(),
            duration,
            call_site: None,
            timestamp: None
        }
    }

    pub fn with_call_site(mut self, call_site: impl Into<String>) -> Self {
        self.call_site = Some(call_site.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Statement kind derived from the leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Begin,
    Commit,
    Rollback,
    Lock,
    /// DDL and grants (CREATE, ALTER, DROP, TRUNCATE, GRANT, REVOKE)
    Other
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Begin => write!(f, "BEGIN"),
            Self::Commit => write!(f, "COMMIT"),
            Self::Rollback => write!(f, "ROLLBACK"),
            Self::Lock => write!(f, "LOCK"),
            Self::Other => write!(f, "OTHER")
        }
    }
}

/// Canonical query record, immutable once created.
///
/// Detectors only ever read these; a batch is closed before analysis starts.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRecord {
    pub sql:       String,
    pub duration:  f64,
    pub timestamp: DateTime<Utc>,
    pub call_site: CompactString,
    pub kind:      StatementKind,
    pub signature: CompactString
}

static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'(?:[^']|'')*'").expect("valid regex"));

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%s|\$\d+").expect("valid regex"));

static NUMERIC_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid regex"));

static OPERATOR_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([=<>!,;()])\s*").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static LEADING_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z]+)").expect("valid regex"));

/// Derive the grouping signature for a SQL string.
///
/// Literal stripping rule: single-quoted strings, bind placeholders
/// (`%s`, `$1`, `?`) and bare numeric tokens all become `?`, the text is
/// lowercased, spacing around comparison operators and punctuation is
/// removed, remaining whitespace collapses to single spaces and a trailing
/// `;` is dropped. `SELECT * FROM t WHERE id=1` and
/// `SELECT * FROM t WHERE id = 2` therefore share one signature.
pub fn signature(sql: &str) -> CompactString {
    let s = STRING_LITERAL.replace_all(sql, "?");
    let s = PLACEHOLDER.replace_all(&s, "?");
    let s = NUMERIC_LITERAL.replace_all(&s, "?");
    let s = s.to_lowercase();
    let s = OPERATOR_SPACING.replace_all(&s, "$1");
    let s = WHITESPACE.replace_all(&s, " ");
    CompactString::from(s.trim().trim_end_matches(';'))
}

/// Classify a statement by its leading keyword.
///
/// Returns `None` when no statement skeleton can be determined, which makes
/// the capture malformed.
pub fn statement_kind(sql: &str) -> Option<StatementKind> {
    let keyword = LEADING_KEYWORD.captures(sql)?.get(1)?.as_str().to_uppercase();
    match keyword.as_str() {
        "SELECT" | "WITH" => Some(StatementKind::Select),
        "INSERT" => Some(StatementKind::Insert),
        "UPDATE" => Some(StatementKind::Update),
        "DELETE" => Some(StatementKind::Delete),
        "BEGIN" | "START" => Some(StatementKind::Begin),
        "COMMIT" | "END" => Some(StatementKind::Commit),
        "ROLLBACK" => Some(StatementKind::Rollback),
        "LOCK" => Some(StatementKind::Lock),
        "CREATE" | "ALTER" | "DROP" | "TRUNCATE" | "GRANT" | "REVOKE" => {
            Some(StatementKind::Other)
        }
        _ => None
    }
}

/// Normalize one raw capture into a canonical record.
///
/// Pure transform; fails with a malformed query error when the SQL text is
/// empty or its statement kind cannot be determined.
pub fn normalize(raw: &RawCapture) -> AppResult<QueryRecord> {
    let sql = raw.sql.trim();
    if sql.is_empty() {
        return Err(malformed_query_error("empty SQL text"));
    }
    let kind = statement_kind(sql).ok_or_else(|| {
        malformed_query_error(format!(
            "cannot determine statement kind of '{}'",
            truncate(sql, 80)
        ))
    })?;
    if raw.duration < 0.0 || !raw.duration.is_finite() {
        return Err(malformed_query_error(format!(
            "invalid duration {}",
            raw.duration
        )));
    }
    Ok(QueryRecord {
        sql: sql.to_string(),
        duration: raw.duration,
        timestamp: raw.timestamp.unwrap_or_default(),
        call_site: raw
            .call_site
            .as_deref()
            .map(CompactString::from)
            .unwrap_or_else(|| CompactString::from(UNKNOWN_CALL_SITE)),
        kind,
        signature: signature(sql)
    })
}

/// Normalize a batch, dropping malformed captures.
///
/// Returns the surviving records together with the dropped count, which the
/// inspection report carries as metadata. Record-level failures never abort
/// the batch.
pub fn normalize_batch(raws: &[RawCapture]) -> (Vec<QueryRecord>, usize) {
    let mut records = Vec::with_capacity(raws.len());
    let mut dropped = 0usize;
    for raw in raws {
        match normalize(raw) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(error = %err, "dropping malformed capture");
                dropped += 1;
            }
        }
    }
    (records, dropped)
}

/// Truncate text at a character boundary, appending an ellipsis marker
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{} ... [truncated]", cut)
    }
}
