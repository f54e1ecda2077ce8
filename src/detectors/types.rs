//! Type definitions for the inspection engine.
//!
//! This module defines the core types used throughout detection and
//! reporting:
//! - [`PatternType`] - The closed set of detectable inefficiency patterns
//! - [`Severity`] - Finding severity levels (Info, Warning, Error)
//! - [`Finding`] - A detected inefficiency, aggregated across occurrences
//! - [`InspectionReport`] - Complete results of one analysis pass

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;

use crate::record::{QueryRecord, truncate};

/// Type alias for the distinct call sites of a finding (typically few)
pub type CallSiteVec = SmallVec<[CompactString; 4]>;

/// Inefficiency pattern detected in a query batch.
///
/// The set is closed: every pattern has exactly one tip template registered
/// in the report builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternType {
    NPlusOne,
    CartesianProduct,
    LargeOffset,
    MissingIndex,
    LockTimeout,
    LongTransaction,
    SmallTableRedundant,
    SlowQuery
}

impl PatternType {
    /// Default severity used for ranking labels and exit codes
    pub fn severity(self) -> Severity {
        match self {
            Self::CartesianProduct => Severity::Error,
            Self::NPlusOne
            | Self::LargeOffset
            | Self::LockTimeout
            | Self::LongTransaction
            | Self::SlowQuery => Severity::Warning,
            Self::MissingIndex | Self::SmallTableRedundant => Severity::Info
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NPlusOne => write!(f, "N_PLUS_ONE"),
            Self::CartesianProduct => write!(f, "CARTESIAN_PRODUCT"),
            Self::LargeOffset => write!(f, "LARGE_OFFSET"),
            Self::MissingIndex => write!(f, "MISSING_INDEX"),
            Self::LockTimeout => write!(f, "LOCK_TIMEOUT"),
            Self::LongTransaction => write!(f, "LONG_TRANSACTION"),
            Self::SmallTableRedundant => write!(f, "SMALL_TABLE_REDUNDANT"),
            Self::SlowQuery => write!(f, "SLOW_QUERY")
        }
    }
}

/// Severity level of a finding.
///
/// Ordered from lowest to highest severity. Exit codes are determined by the
/// highest severity finding in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// Heuristic signal, does not affect exit code
    Info,
    /// Likely inefficiency (exit code 1)
    Warning,
    /// Near-certain inefficiency that must be addressed (exit code 2)
    Error
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR")
        }
    }
}

/// Metadata about a detector for identification and logging
#[derive(Debug, Clone)]
pub struct DetectorInfo {
    /// Human-readable detector name
    pub name:    &'static str,
    /// Patterns this detector may emit
    pub patterns: &'static [PatternType]
}

/// A single detected inefficiency.
///
/// Detectors emit findings per match; the aggregator merges findings that
/// share `(pattern, signature)`, so `occurrences` ends up as the number of
/// matching records in the batch. Findings live for one analysis pass only.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub pattern:      PatternType,
    /// Normalized signature of the offending query, the grouping key
    pub signature:    CompactString,
    /// Number of matching records, always >= 1
    pub occurrences:  u64,
    /// Representative raw SQL, truncated for display
    pub sample_query: String,
    /// Distinct source locations, may include "Unknown"
    pub call_sites:   CallSiteVec,
    /// Timestamp of the first matching record in the batch
    pub detected_at:  DateTime<Utc>,
    /// Detector-specific context used to parameterize the tip
    /// (measured duration, offset value, suggested index DDL)
    pub detail:       Option<String>
}

impl Finding {
    pub fn severity(&self) -> Severity {
        self.pattern.severity()
    }

    /// Build a finding from the records that matched a detector.
    ///
    /// Takes the signature and a truncated sample from the first record,
    /// collects distinct call sites in first-seen order, and keeps the
    /// earliest timestamp. Returns `None` for an empty match set, so a
    /// finding with zero occurrences can never exist.
    pub fn from_records<'a>(
        pattern: PatternType,
        records: impl IntoIterator<Item = &'a QueryRecord>,
        detail: Option<String>
    ) -> Option<Self> {
        let mut iter = records.into_iter();
        let first = iter.next()?;
        let mut occurrences = 1u64;
        let mut call_sites = CallSiteVec::new();
        call_sites.push(first.call_site.clone());
        let mut detected_at = first.timestamp;
        for record in iter {
            occurrences += 1;
            if !call_sites.contains(&record.call_site) {
                call_sites.push(record.call_site.clone());
            }
            if record.timestamp < detected_at {
                detected_at = record.timestamp;
            }
        }
        Some(Self {
            pattern,
            signature: first.signature.clone(),
            occurrences,
            sample_query: truncate(&first.sql, SAMPLE_QUERY_MAX_CHARS),
            call_sites,
            detected_at,
            detail
        })
    }
}

/// Display width of sample queries in findings
pub const SAMPLE_QUERY_MAX_CHARS: usize = 500;

/// A finding paired with its rendered optimization tip
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    #[serde(flatten)]
    pub finding:  Finding,
    pub severity: Severity,
    pub tip_text: String
}

/// Complete results of one inspection pass.
///
/// Use [`error_count`](Self::error_count) and
/// [`warning_count`](Self::warning_count) to derive exit codes.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    /// Findings with tips, in aggregation order (first occurrence first)
    pub entries:          Vec<ReportEntry>,
    /// Number of records analyzed after normalization
    pub records_analyzed: usize,
    /// Number of malformed captures dropped during normalization
    pub records_dropped:  usize,
    /// Number of detectors executed
    pub detectors_run:    usize
}

impl InspectionReport {
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Info)
            .count()
    }
}
