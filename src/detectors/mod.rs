//! Pattern detection engine for captured query batches.
//!
//! This module provides the detector execution engine that inspects one
//! closed batch of [`QueryRecord`]s for inefficiency patterns. Detectors
//! are implemented as types that implement the [`Detector`] trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌────────────┐     ┌──────────┐
//! │   Batch     │────▶│  Inspector  │────▶│ Aggregator │────▶│  Report  │
//! └─────────────┘     └─────────────┘     └────────────┘     └──────────┘
//!                            │
//!                     ┌──────┴──────┐
//!                     │  Detectors  │
//!                     │  (parallel) │
//!                     └─────────────┘
//! ```
//!
//! The [`Inspector`] holds a static, explicit detector set and fans each
//! detector out over the batch with [`rayon`]. Detector outputs are merged,
//! never sequenced, and rayon's order-preserving collect keeps the merged
//! candidate order (and so the whole pass) deterministic.
//!
//! # Scope contract
//!
//! One batch is one logical request or one CLI invocation. The capture
//! layer partitions records into scopes before calling [`Inspector::analyze`];
//! the inspector never merges across scopes and keeps no state between
//! passes.

mod fanout;
mod structure;
mod timing;
mod types;

use rayon::prelude::*;
use tracing::debug;
pub use fanout::{NPlusOne, RepeatedFilterScan, extract_tables};
pub use structure::{CartesianProduct, LargeOffset, has_unconstrained_join};
pub use timing::{LockTimeout, LongTransaction, SlowQuery};
pub use types::{
    CallSiteVec, DetectorInfo, Finding, InspectionReport, PatternType, ReportEntry, Severity
};

use crate::{
    aggregate::aggregate,
    config::Config,
    error::AppResult,
    record::{QueryRecord, RawCapture, normalize_batch},
    report::build_report
};

/// Trait for implementing inefficiency detectors.
///
/// Detectors are stateless per batch: they examine the full ordered batch
/// and return finding candidates for every match. They must be
/// `Send + Sync` for parallel execution, and they never share mutable
/// state. A record a detector cannot evaluate is skipped, never fatal.
pub trait Detector: Send + Sync {
    /// Returns metadata about this detector.
    fn info(&self) -> DetectorInfo;

    /// Inspects a closed batch and returns finding candidates.
    ///
    /// Emits one candidate per match (or one per matched group, with
    /// `occurrences` already counted); the aggregator merges candidates
    /// that share `(pattern, signature)`.
    fn detect(&self, batch: &[QueryRecord], config: &Config) -> Vec<Finding>;
}

/// Detector execution engine.
///
/// Holds the static detector set and runs one analysis pass at a time.
/// Analysis is a pure function of the batch plus configuration: the same
/// input always yields the identical ordered report.
///
/// # Example
///
/// ```ignore
/// let inspector = Inspector::new();
/// let report = inspector.analyze_captures(&captures, &Config::default())?;
/// println!("{} findings", report.entries.len());
/// ```
pub struct Inspector {
    detectors: Vec<Box<dyn Detector>>
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    /// Create an inspector with the full built-in detector set
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(fanout::NPlusOne),
                Box::new(structure::CartesianProduct),
                Box::new(structure::LargeOffset),
                Box::new(fanout::RepeatedFilterScan),
                Box::new(timing::LockTimeout),
                Box::new(timing::LongTransaction),
                Box::new(timing::SlowQuery),
            ]
        }
    }

    /// Run all detectors over a normalized batch.
    ///
    /// Validates the configuration first: a bad threshold fails the whole
    /// call before any detection runs. Detector candidates are aggregated
    /// and paired with optimization tips.
    pub fn analyze(&self, batch: &[QueryRecord], config: &Config) -> AppResult<InspectionReport> {
        config.thresholds.validate()?;

        let candidates: Vec<Finding> = self
            .detectors
            .par_iter()
            .flat_map(|detector| {
                let found = detector.detect(batch, config);
                debug!(
                    detector = detector.info().name,
                    candidates = found.len(),
                    "detector pass complete"
                );
                found
            })
            .collect();

        let findings = aggregate(candidates);
        let entries = build_report(findings)?;

        Ok(InspectionReport {
            entries,
            records_analyzed: batch.len(),
            records_dropped: 0,
            detectors_run: self.detectors.len()
        })
    }

    /// Normalize raw captures and analyze the surviving records.
    ///
    /// Malformed captures are dropped and surface as
    /// `records_dropped` metadata; they never abort the pass.
    pub fn analyze_captures(
        &self,
        captures: &[RawCapture],
        config: &Config
    ) -> AppResult<InspectionReport> {
        let (batch, dropped) = normalize_batch(captures);
        let mut report = self.analyze(&batch, config)?;
        report.records_dropped = dropped;
        Ok(report)
    }
}
