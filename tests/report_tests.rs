use query_sheriff::detectors::{CallSiteVec, Finding, PatternType, Severity};
use query_sheriff::report::{build_report, render_tip, tip_for};

const ALL_PATTERNS: &[PatternType] = &[
    PatternType::NPlusOne,
    PatternType::CartesianProduct,
    PatternType::LargeOffset,
    PatternType::MissingIndex,
    PatternType::LockTimeout,
    PatternType::LongTransaction,
    PatternType::SmallTableRedundant,
    PatternType::SlowQuery,
];

fn finding(pattern: PatternType, detail: Option<String>) -> Finding {
    let mut call_sites = CallSiteVec::new();
    call_sites.push("app/views.py:10".into());
    Finding {
        pattern,
        signature: "select * from t where id=?".into(),
        occurrences: 3,
        sample_query: "SELECT * FROM t WHERE id = 1".to_string(),
        call_sites,
        detected_at: Default::default(),
        detail
    }
}

#[test]
fn test_every_pattern_has_a_tip() {
    for pattern in ALL_PATTERNS {
        let template = tip_for(*pattern).unwrap();
        assert!(!template.impact.is_empty());
        assert!(!template.cause.is_empty());
        assert!(!template.recommendation.is_empty());
    }
}

#[test]
fn test_render_tip_structure() {
    let tip = render_tip(&finding(PatternType::NPlusOne, None)).unwrap();
    assert!(tip.contains("Impact: "));
    assert!(tip.contains("Cause: "));
    assert!(tip.contains("Recommendation: "));
    assert!(!tip.contains("Detail: "));
}

#[test]
fn test_render_tip_includes_detail() {
    let tip = render_tip(&finding(
        PatternType::LargeOffset,
        Some("OFFSET 5000".to_string())
    ))
    .unwrap();
    assert!(tip.contains("Detail: OFFSET 5000"));
}

#[test]
fn test_render_tip_mentions_eager_loading_for_n_plus_one() {
    let tip = render_tip(&finding(PatternType::NPlusOne, None)).unwrap();
    assert!(tip.contains("eager loading"));
}

#[test]
fn test_build_report_preserves_order_and_assigns_severity() {
    let entries = build_report(vec![
        finding(PatternType::SlowQuery, None),
        finding(PatternType::CartesianProduct, None),
        finding(PatternType::MissingIndex, None),
    ])
    .unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].finding.pattern, PatternType::SlowQuery);
    assert_eq!(entries[0].severity, Severity::Warning);
    assert_eq!(entries[1].severity, Severity::Error);
    assert_eq!(entries[2].severity, Severity::Info);
    assert!(!entries[0].tip_text.is_empty());
}

#[test]
fn test_build_report_empty() {
    assert!(build_report(Vec::new()).unwrap().is_empty());
}
