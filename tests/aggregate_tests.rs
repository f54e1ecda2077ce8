use chrono::{DateTime, TimeZone, Utc};
use query_sheriff::aggregate::aggregate;
use query_sheriff::detectors::{CallSiteVec, Finding, PatternType};

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).unwrap()
}

fn finding(
    pattern: PatternType,
    signature: &str,
    occurrences: u64,
    call_site: &str,
    detected_at: DateTime<Utc>
) -> Finding {
    let mut call_sites = CallSiteVec::new();
    call_sites.push(call_site.into());
    Finding {
        pattern,
        signature: signature.into(),
        occurrences,
        sample_query: signature.to_uppercase(),
        call_sites,
        detected_at,
        detail: None
    }
}

#[test]
fn test_aggregate_merges_same_pattern_and_signature() {
    let merged = aggregate(vec![
        finding(PatternType::NPlusOne, "select * from t where id=?", 2, "a.py:1", at(100)),
        finding(PatternType::NPlusOne, "select * from t where id=?", 3, "b.py:2", at(50)),
    ]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].occurrences, 5);
    assert_eq!(merged[0].call_sites.len(), 2);
    assert_eq!(merged[0].detected_at, at(50));
}

#[test]
fn test_aggregate_deduplicates_call_sites() {
    let merged = aggregate(vec![
        finding(PatternType::SlowQuery, "select ?", 1, "a.py:1", at(0)),
        finding(PatternType::SlowQuery, "select ?", 1, "a.py:1", at(0)),
    ]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].call_sites.len(), 1);
}

#[test]
fn test_aggregate_keeps_distinct_patterns_separate() {
    let merged = aggregate(vec![
        finding(PatternType::SlowQuery, "select * from t for update", 1, "a.py:1", at(0)),
        finding(PatternType::LockTimeout, "select * from t for update", 1, "a.py:1", at(0)),
    ]);
    assert_eq!(merged.len(), 2);
}

#[test]
fn test_aggregate_keeps_first_detail() {
    let mut first = finding(PatternType::LargeOffset, "select * offset ?", 1, "a.py:1", at(0));
    first.detail = Some("OFFSET 1000".to_string());
    let mut second = finding(PatternType::LargeOffset, "select * offset ?", 1, "a.py:2", at(1));
    second.detail = Some("OFFSET 2000".to_string());
    let merged = aggregate(vec![first, second]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].detail.as_deref(), Some("OFFSET 1000"));
}

#[test]
fn test_aggregate_preserves_first_seen_order() {
    let merged = aggregate(vec![
        finding(PatternType::SlowQuery, "q1", 1, "a.py:1", at(0)),
        finding(PatternType::LargeOffset, "q2", 1, "a.py:1", at(0)),
        finding(PatternType::SlowQuery, "q1", 1, "a.py:1", at(0)),
        finding(PatternType::NPlusOne, "q3", 1, "a.py:1", at(0)),
    ]);
    let order: Vec<PatternType> = merged.iter().map(|f| f.pattern).collect();
    assert_eq!(
        order,
        vec![PatternType::SlowQuery, PatternType::LargeOffset, PatternType::NPlusOne]
    );
}

#[test]
fn test_aggregate_is_idempotent() {
    let once = aggregate(vec![
        finding(PatternType::NPlusOne, "q1", 2, "a.py:1", at(10)),
        finding(PatternType::NPlusOne, "q1", 3, "b.py:1", at(5)),
        finding(PatternType::SlowQuery, "q2", 1, "a.py:1", at(0)),
    ]);
    let twice = aggregate(once.clone());
    assert_eq!(once.len(), twice.len());
    for (a, b) in once.iter().zip(&twice) {
        assert_eq!(a.pattern, b.pattern);
        assert_eq!(a.signature, b.signature);
        assert_eq!(a.occurrences, b.occurrences);
        assert_eq!(a.call_sites, b.call_sites);
        assert_eq!(a.detected_at, b.detected_at);
    }
}

#[test]
fn test_aggregate_empty_input() {
    assert!(aggregate(Vec::new()).is_empty());
}
