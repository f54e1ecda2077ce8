//! Duration-based detectors: slow queries, held locks, long transactions.

use super::{Detector, DetectorInfo, Finding, PatternType};
use crate::{config::Config, record::{QueryRecord, StatementKind}};

/// Slow query detector.
///
/// Flags any record whose duration strictly exceeds the slow-query
/// threshold, independent of whatever else the query matches. A duration
/// exactly at the threshold does not flag.
pub struct SlowQuery;

impl Detector for SlowQuery {
    fn info(&self) -> DetectorInfo {
        DetectorInfo {
            name:     "Slow query",
            patterns: &[PatternType::SlowQuery]
        }
    }

    fn detect(&self, batch: &[QueryRecord], config: &Config) -> Vec<Finding> {
        batch
            .iter()
            .filter(|record| record.duration > config.thresholds.slow_query_threshold)
            .filter_map(|record| {
                Finding::from_records(
                    PatternType::SlowQuery,
                    [record],
                    Some(format!("{:.3}s", record.duration))
                )
            })
            .collect()
    }
}

/// Is this statement one that takes or holds row/table locks explicitly?
fn is_locking(record: &QueryRecord) -> bool {
    record.kind == StatementKind::Lock
        || record.signature.contains(" for update")
        || record.signature.contains(" for share")
}

/// Lock timeout detector.
///
/// A locking statement (`SELECT ... FOR UPDATE`, `LOCK TABLE`) held longer
/// than the lock threshold blocks every competing writer for that long.
pub struct LockTimeout;

impl Detector for LockTimeout {
    fn info(&self) -> DetectorInfo {
        DetectorInfo {
            name:     "Long-held lock",
            patterns: &[PatternType::LockTimeout]
        }
    }

    fn detect(&self, batch: &[QueryRecord], config: &Config) -> Vec<Finding> {
        batch
            .iter()
            .filter(|record| {
                is_locking(record) && record.duration > config.thresholds.lock_threshold
            })
            .filter_map(|record| {
                Finding::from_records(
                    PatternType::LockTimeout,
                    [record],
                    Some(format!("held {:.3}s", record.duration))
                )
            })
            .collect()
    }
}

/// Long transaction detector.
///
/// Walks the ordered batch tracking BEGIN .. COMMIT/ROLLBACK spans and
/// accumulating statement durations. A span whose cumulative duration
/// exceeds the transaction threshold flags once, keyed by its opening
/// statement. A span still open at the end of the batch counts too.
pub struct LongTransaction;

impl Detector for LongTransaction {
    fn info(&self) -> DetectorInfo {
        DetectorInfo {
            name:     "Long transaction",
            patterns: &[PatternType::LongTransaction]
        }
    }

    fn detect(&self, batch: &[QueryRecord], config: &Config) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut open: Option<(&QueryRecord, f64, usize)> = None;

        let mut close = |span: Option<(&QueryRecord, f64, usize)>| {
            if let Some((begin, total, statements)) = span
                && total > config.thresholds.transaction_threshold
                && let Some(finding) = Finding::from_records(
                    PatternType::LongTransaction,
                    [begin],
                    Some(format!("{} statements over {:.3}s", statements, total))
                )
            {
                findings.push(finding);
            }
        };

        for record in batch {
            match record.kind {
                StatementKind::Begin => {
                    let previous = open.take();
                    close(previous);
                    open = Some((record, record.duration, 1));
                }
                StatementKind::Commit | StatementKind::Rollback => {
                    if let Some((begin, total, statements)) = open.take() {
                        close(Some((begin, total + record.duration, statements + 1)));
                    }
                }
                _ => {
                    if let Some((_, total, statements)) = open.as_mut() {
                        *total += record.duration;
                        *statements += 1;
                    }
                }
            }
        }
        close(open);
        findings
    }
}
