//! Structural detectors operating on the query text itself.
//!
//! These are deliberate token-scan heuristics, not a SQL parse: captured ORM
//! output routinely contains bind placeholders (`%s`, `$1`) that a strict
//! parser rejects. False negatives are acceptable; false positives are
//! minimized by requiring an explicit JOIN token before flagging.

use std::sync::LazyLock;

use regex::Regex;

use super::{Detector, DetectorInfo, Finding, PatternType};
use crate::{config::Config, record::{QueryRecord, StatementKind}};

static OFFSET_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bOFFSET\s+(\d+)").expect("valid regex"));

/// Keywords that end a JOIN clause. Reaching one of these (or end of
/// statement) without seeing ON or USING means the join is unconstrained.
const CLAUSE_BOUNDARIES: &[&str] = &[
    "join", "inner", "left", "right", "full", "outer", "cross", "natural", "where", "group",
    "order", "limit", "offset", "union", "having"
];

fn is_boundary(token: &str) -> bool {
    CLAUSE_BOUNDARIES.contains(&token)
}

/// Signature normalization glues `(` to the preceding word, so `ON (...)`
/// arrives as one `on(...)` token.
fn is_constraint(token: &str) -> bool {
    token == "on" || token == "using" || token.starts_with("on(") || token.starts_with("using(")
}

/// Scan a normalized signature for a JOIN with no ON/USING constraint.
///
/// Walks tokens after each `join`: a table name, an optional alias (with or
/// without `as`), then the constraint keyword. `CROSS JOIN` always counts;
/// `NATURAL JOIN` never does, since its constraint is implicit.
pub fn has_unconstrained_join(signature: &str) -> bool {
    let tokens: Vec<&str> = signature.split_whitespace().collect();
    for (i, token) in tokens.iter().enumerate() {
        if *token != "join" {
            continue;
        }
        if i > 0 && tokens[i - 1] == "natural" {
            continue;
        }
        if i > 0 && tokens[i - 1] == "cross" {
            return true;
        }
        // Table name must follow; a dangling JOIN is not our business.
        let Some(table) = tokens.get(i + 1) else {
            continue;
        };
        if is_boundary(table) {
            continue;
        }
        let mut next = i + 2;
        match tokens.get(next) {
            None => return true,
            Some(tok) if is_constraint(tok) => continue,
            Some(&"as") => next += 2,
            Some(tok) if is_boundary(tok) => return true,
            // Bare alias token
            Some(_) => next += 1
        }
        match tokens.get(next) {
            None => return true,
            Some(tok) if is_constraint(tok) => continue,
            Some(_) => return true
        }
    }
    false
}

/// Cartesian product detector.
///
/// A JOIN without an ON or USING clause multiplies the two tables into a
/// full cross product.
pub struct CartesianProduct;

impl Detector for CartesianProduct {
    fn info(&self) -> DetectorInfo {
        DetectorInfo {
            name:     "Cartesian product in JOIN",
            patterns: &[PatternType::CartesianProduct]
        }
    }

    fn detect(&self, batch: &[QueryRecord], _config: &Config) -> Vec<Finding> {
        batch
            .iter()
            .filter(|record| {
                record.kind == StatementKind::Select
                    && has_unconstrained_join(&record.signature)
            })
            .filter_map(|record| {
                Finding::from_records(PatternType::CartesianProduct, [record], None)
            })
            .collect()
    }
}

/// Large offset detector.
///
/// OFFSET-based pagination scans and discards every skipped row, so cost
/// grows linearly with the offset value. Records whose OFFSET value cannot
/// be parsed are skipped, never fatal.
pub struct LargeOffset;

impl Detector for LargeOffset {
    fn info(&self) -> DetectorInfo {
        DetectorInfo {
            name:     "Large OFFSET pagination",
            patterns: &[PatternType::LargeOffset]
        }
    }

    fn detect(&self, batch: &[QueryRecord], config: &Config) -> Vec<Finding> {
        let mut findings = Vec::new();
        for record in batch {
            let Some(caps) = OFFSET_VALUE.captures(&record.sql) else {
                continue;
            };
            let Ok(offset) = caps[1].parse::<u64>() else {
                continue;
            };
            if offset > config.thresholds.offset_threshold
                && let Some(finding) = Finding::from_records(
                    PatternType::LargeOffset,
                    [record],
                    Some(format!("OFFSET {}", offset))
                )
            {
                findings.push(finding);
            }
        }
        findings
    }
}
