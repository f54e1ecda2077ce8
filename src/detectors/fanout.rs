//! Fan-out detectors: repeated queries that should have been one.
//!
//! Both detectors group the batch by signature, so structurally identical
//! queries with different bound parameters land in the same bucket. The N+1
//! detector looks for per-row key lookups repeated across a request; the
//! repeated-filter detector looks for the same filtered scan executed over
//! and over, which points at a missing index or, on a known-small table, at
//! a query that should simply be cached.

use std::sync::LazyLock;

use compact_str::CompactString;
use indexmap::IndexMap;
use regex::Regex;

use super::{Detector, DetectorInfo, Finding, PatternType};
use crate::{config::Config, record::{QueryRecord, StatementKind}};

/// Single identifier compared against one bound value, e.g. `id=?` or
/// `user_id in(?,?)`. Matched against the normalized WHERE clause.
static SINGLE_KEY_LOOKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"?[\w.]+"?(=\?|\s?in\(\?(,\?)*\))$"#).expect("valid regex")
});

static TABLE_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bFROM\s+["']?([\w.]+)["']?|\bJOIN\s+["']?([\w.]+)["']?"#)
        .expect("valid regex")
});

static WHERE_COLUMNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:WHERE|AND)\s+["']?([\w.]+)["']?\s*="#).expect("valid regex")
});

/// Extract the normalized WHERE clause from a signature, stopping at the
/// next clause boundary.
fn where_clause(signature: &str) -> Option<&str> {
    let start = signature.find(" where ")? + " where ".len();
    let rest = &signature[start..];
    let end = [" order by", " group by", " limit", " offset", " for update", " for share"]
        .iter()
        .filter_map(|boundary| rest.find(boundary))
        .min()
        .unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Extract table names referenced in FROM and JOIN clauses
pub fn extract_tables(sql: &str) -> Vec<CompactString> {
    let mut tables: Vec<CompactString> = Vec::new();
    for caps in TABLE_NAMES.captures_iter(sql) {
        if let Some(name) = caps.get(1).or_else(|| caps.get(2))
            && !tables.iter().any(|t| t.as_str() == name.as_str())
        {
            tables.push(CompactString::from(name.as_str()));
        }
    }
    tables
}

/// Extract equality-filtered column names from a WHERE clause
fn extract_where_columns(sql: &str) -> Vec<CompactString> {
    let mut columns: Vec<CompactString> = Vec::new();
    for caps in WHERE_COLUMNS.captures_iter(sql) {
        if let Some(name) = caps.get(1)
            && !columns.iter().any(|c| c.as_str() == name.as_str())
        {
            columns.push(CompactString::from(name.as_str()));
        }
    }
    columns
}

/// Group filtered SELECTs by signature, preserving batch order.
///
/// Restricting to SELECT statements also drops the legitimate kinds of
/// repetition (transaction control, bulk writes) from consideration.
fn group_filtered_selects<'a>(
    batch: &'a [QueryRecord],
    require_no_join: bool
) -> IndexMap<&'a CompactString, Vec<&'a QueryRecord>> {
    let mut groups: IndexMap<&CompactString, Vec<&QueryRecord>> = IndexMap::new();
    for record in batch {
        if record.kind != StatementKind::Select {
            continue;
        }
        if !record.signature.contains(" where ") {
            continue;
        }
        if require_no_join && record.signature.contains(" join ") {
            continue;
        }
        groups.entry(&record.signature).or_default().push(record);
    }
    groups
}

/// N+1 query detector.
///
/// A parent query followed by one key lookup per parent row shows up in a
/// captured batch as the same signature repeated with different parameters.
/// Only simple single-key lookups without JOINs are flagged; anything more
/// structured is too ambiguous for this heuristic.
pub struct NPlusOne;

impl Detector for NPlusOne {
    fn info(&self) -> DetectorInfo {
        DetectorInfo {
            name:     "N+1 query fan-out",
            patterns: &[PatternType::NPlusOne]
        }
    }

    fn detect(&self, batch: &[QueryRecord], _config: &Config) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (signature, records) in group_filtered_selects(batch, true) {
            if records.len() < 2 {
                continue;
            }
            let Some(clause) = where_clause(signature) else {
                continue;
            };
            if !SINGLE_KEY_LOOKUP.is_match(clause) {
                continue;
            }
            if let Some(finding) =
                Finding::from_records(PatternType::NPlusOne, records.iter().copied(), None)
            {
                findings.push(finding);
            }
        }
        findings
    }
}

/// Repeated filtered-scan detector.
///
/// The same WHERE-filtered SELECT executed repeatedly within one scope is a
/// heuristic signal, never a verdict: on a table known to be below the
/// small-table threshold the query is redundant and should be cached, while
/// on larger or unknown tables the filter columns are candidates for an
/// index. Row counts come from externally supplied estimates; the core
/// never sees real table statistics.
pub struct RepeatedFilterScan;

impl RepeatedFilterScan {
    fn index_suggestion(sql: &str) -> Option<String> {
        let tables = extract_tables(sql);
        let table = tables.first()?;
        let columns = extract_where_columns(sql);
        if columns.is_empty() {
            return None;
        }
        let bare: Vec<&str> = columns
            .iter()
            .map(|c| c.rsplit('.').next().unwrap_or(c.as_str()))
            .collect();
        Some(format!(
            "CREATE INDEX idx_{}_{} ON {}({});",
            table.replace('.', "_"),
            bare.join("_"),
            table,
            bare.join(", ")
        ))
    }
}

impl Detector for RepeatedFilterScan {
    fn info(&self) -> DetectorInfo {
        DetectorInfo {
            name:     "Repeated filtered scan",
            patterns: &[PatternType::MissingIndex, PatternType::SmallTableRedundant]
        }
    }

    fn detect(&self, batch: &[QueryRecord], config: &Config) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (_, records) in group_filtered_selects(batch, false) {
            if records.len() < 2 {
                continue;
            }
            let sample = records[0];
            let tables = extract_tables(&sample.sql);
            if tables.is_empty() {
                continue;
            }
            // Without supplied row estimates the core has nothing to say.
            let estimates: Vec<u64> = tables
                .iter()
                .filter_map(|table| config.tables.get(table.as_str()).copied())
                .collect();
            if estimates.len() != tables.len() {
                continue;
            }
            let all_small = estimates
                .iter()
                .all(|rows| *rows < config.thresholds.small_table_threshold);
            let (pattern, detail) = if all_small {
                (PatternType::SmallTableRedundant, None)
            } else {
                (PatternType::MissingIndex, Self::index_suggestion(&sample.sql))
            };
            if let Some(finding) = Finding::from_records(pattern, records.iter().copied(), detail)
            {
                findings.push(finding);
            }
        }
        findings
    }
}
