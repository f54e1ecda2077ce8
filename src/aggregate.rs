//! Aggregation of raw detector findings.
//!
//! Detectors emit one finding per match without coordinating with each
//! other. Aggregation merges findings that share `(pattern, signature)`:
//! occurrences are summed, call sites are unioned, and the earliest
//! detection timestamp wins. Output order is the insertion order of each
//! group's first candidate, which is deterministic because detectors run in
//! a fixed order.

use compact_str::CompactString;
use indexmap::{IndexMap, map::Entry};

use crate::detectors::{Finding, PatternType};

/// Merge finding candidates into de-duplicated findings.
///
/// Idempotent: aggregating an already aggregated sequence changes nothing,
/// since each `(pattern, signature)` group is already unique. Never yields a
/// finding with zero occurrences because detectors only emit on a match.
pub fn aggregate(candidates: Vec<Finding>) -> Vec<Finding> {
    let mut groups: IndexMap<(PatternType, CompactString), Finding> =
        IndexMap::with_capacity(candidates.len());

    for candidate in candidates {
        match groups.entry((candidate.pattern, candidate.signature.clone())) {
            Entry::Occupied(mut entry) => {
                let finding = entry.get_mut();
                finding.occurrences += candidate.occurrences;
                for site in candidate.call_sites {
                    if !finding.call_sites.contains(&site) {
                        finding.call_sites.push(site);
                    }
                }
                if candidate.detected_at < finding.detected_at {
                    finding.detected_at = candidate.detected_at;
                }
                if finding.detail.is_none() {
                    finding.detail = candidate.detail;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(candidate);
            }
        }
    }

    groups.into_values().collect()
}
