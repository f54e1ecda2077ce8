//! Report building: pairing findings with optimization tips.
//!
//! Each pattern type maps to exactly one static tip template (impact,
//! cause, recommendation, best practice). The template body is fixed per
//! pattern; only the recommendation line is parameterized with the
//! finding's detector-supplied detail (offset value, suggested index DDL,
//! measured duration).

use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::{
    detectors::{Finding, PatternType, ReportEntry},
    error::{AppResult, unknown_pattern_error}
};

/// Static tip template keyed by pattern type
#[derive(Debug, Clone, Copy)]
pub struct TipTemplate {
    pub impact:         &'static str,
    pub cause:          &'static str,
    pub recommendation: &'static str,
    pub best_practice:  Option<&'static str>
}

static TIP_TEMPLATES: LazyLock<IndexMap<PatternType, TipTemplate>> = LazyLock::new(|| {
    IndexMap::from([
        (
            PatternType::NPlusOne,
            TipTemplate {
                impact:         "One query per parent row multiplies database round trips and \
                                 latency grows linearly with the result set.",
                cause:          "Related objects are fetched lazily inside a loop instead of \
                                 being loaded with the parent rows.",
                recommendation: "Batch the per-row lookups into a single query using an IN list \
                                 or a JOIN; in ORM code enable eager loading \
                                 (select_related/prefetch_related or your ORM's equivalent).",
                best_practice:  Some(
                    "Watch query counts per request in development; a count that scales with \
                     result size is almost always an N+1."
                )
            }
        ),
        (
            PatternType::CartesianProduct,
            TipTemplate {
                impact:         "A JOIN without a join condition produces the full cross \
                                 product of both tables, exploding the result set.",
                cause:          "The JOIN clause is missing its ON or USING constraint.",
                recommendation: "Add an ON or USING clause joining on the related key columns, \
                                 or make the cross join explicit if it is intentional.",
                best_practice:  Some(
                    "Always constrain JOINs; reserve CROSS JOIN for the rare cases where a \
                     cross product is the point."
                )
            }
        ),
        (
            PatternType::LargeOffset,
            TipTemplate {
                impact:         "The database scans and discards every skipped row, so page \
                                 cost grows with the offset value.",
                cause:          "OFFSET-based pagination deep into a large result set.",
                recommendation: "Switch to keyset (cursor-based) pagination: filter on the last \
                                 seen key (WHERE id > :last_id) instead of skipping rows.",
                best_practice:  Some(
                    "Keyset pagination stays O(page size) regardless of depth; track the last \
                     seen record instead of a page number."
                )
            }
        ),
        (
            PatternType::MissingIndex,
            TipTemplate {
                impact:         "Repeated filtered scans without a supporting index degrade \
                                 into sequential scans as the table grows.",
                cause:          "The columns filtered in the WHERE clause appear to lack an \
                                 index.",
                recommendation: "Verify with EXPLAIN that the query performs a sequential scan, \
                                 then add an index on the filter columns.",
                best_practice:  Some(
                    "Avoid indexing very small tables or low-cardinality columns; those \
                     indexes rarely pay for their maintenance cost."
                )
            }
        ),
        (
            PatternType::LockTimeout,
            TipTemplate {
                impact:         "A long-held lock blocks every competing transaction and \
                                 invites deadlocks.",
                cause:          "A locking statement (SELECT ... FOR UPDATE or explicit LOCK) \
                                 ran longer than the configured lock threshold.",
                recommendation: "Shorten the locked section: lock fewer rows, move slow work \
                                 outside the lock, or use SKIP LOCKED/NOWAIT where appropriate.",
                best_practice:  Some(
                    "Keep lock scopes small and prefer optimistic concurrency when contention \
                     is rare."
                )
            }
        ),
        (
            PatternType::LongTransaction,
            TipTemplate {
                impact:         "Long transactions hold locks and bloat undo/vacuum work for \
                                 their entire lifetime.",
                cause:          "The cumulative duration of statements between BEGIN and COMMIT \
                                 exceeded the transaction threshold.",
                recommendation: "Split the transaction into smaller units of work and move \
                                 non-transactional work (I/O, computation) outside it.",
                best_practice:  Some(
                    "Wrap only the statements that must commit atomically; everything else \
                     belongs outside the transaction."
                )
            }
        ),
        (
            PatternType::SmallTableRedundant,
            TipTemplate {
                impact:         "Re-reading a tiny, rarely-changing table on every request \
                                 wastes round trips for data that fits in memory.",
                cause:          "The same filtered query against a table below the small-table \
                                 threshold ran repeatedly in one scope.",
                recommendation: "Cache the table contents in the application layer (or memoize \
                                 the lookup for the request); adding an index will not help a \
                                 table this small.",
                best_practice:  None
            }
        ),
        (
            PatternType::SlowQuery,
            TipTemplate {
                impact:         "Execution time exceeded the slow-query threshold, adding \
                                 user-visible latency.",
                cause:          "The query does more work than the threshold allows: large \
                                 scans, expensive joins, or missing indexes.",
                recommendation: "Inspect the execution plan with EXPLAIN; reduce joined data, \
                                 tighten conditions, or cache the result if it rarely changes.",
                best_practice:  None
            }
        ),
    ])
});

/// Look up the tip template for a pattern.
///
/// The pattern enum is closed, so a missing template is an internal
/// consistency error and propagates to the caller.
pub fn tip_for(pattern: PatternType) -> AppResult<&'static TipTemplate> {
    TIP_TEMPLATES
        .get(&pattern)
        .ok_or_else(|| unknown_pattern_error(pattern))
}

/// Render the full tip text for one finding
pub fn render_tip(finding: &Finding) -> AppResult<String> {
    let template = tip_for(finding.pattern)?;
    let mut tip = String::new();
    tip.push_str(&format!("Impact: {}\n", template.impact));
    tip.push_str(&format!("Cause: {}\n", template.cause));
    tip.push_str(&format!("Recommendation: {}\n", template.recommendation));
    if let Some(detail) = &finding.detail {
        tip.push_str(&format!("Detail: {}\n", detail));
    }
    if let Some(best_practice) = template.best_practice {
        tip.push_str(&format!("Best practice: {}\n", best_practice));
    }
    Ok(tip)
}

/// Pair each finding with its optimization tip, preserving order.
///
/// Fails only on an unregistered pattern type, which should never occur
/// with the closed enum; the error is surfaced, not recovered.
pub fn build_report(findings: Vec<Finding>) -> AppResult<Vec<ReportEntry>> {
    findings
        .into_iter()
        .map(|finding| {
            let tip_text = render_tip(&finding)?;
            let severity = finding.severity();
            Ok(ReportEntry {
                finding,
                severity,
                tip_text
            })
        })
        .collect()
}
