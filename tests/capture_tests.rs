use std::io::Write;

use query_sheriff::capture::{
    from_log_file, from_sql_strings, parse_json_lines, parse_log
};
use tempfile::NamedTempFile;

#[test]
fn test_parse_log_extracts_sql_lines() {
    let content = "\
[INFO] request started
[DEBUG] SQL: SELECT * FROM users WHERE id = 1
[DEBUG] SQL: UPDATE users SET seen = now() WHERE id = 1
[INFO] request finished
";
    let captures = parse_log(content);
    assert_eq!(captures.len(), 2);
    assert_eq!(captures[0].sql, "SELECT * FROM users WHERE id = 1");
    assert_eq!(captures[0].duration, 0.01);
    assert!(captures[0].timestamp.is_some());
}

#[test]
fn test_parse_log_skips_invalid_sql() {
    let content = "SQL: definitely not a statement\nSQL: SELECT 1\n";
    let captures = parse_log(content);
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].sql, "SELECT 1");
}

#[test]
fn test_parse_log_empty_input() {
    assert!(parse_log("no queries here\n").is_empty());
}

#[test]
fn test_from_log_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "SQL: SELECT id FROM users").unwrap();
    writeln!(file, "noise line").unwrap();

    let captures = from_log_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(captures.len(), 1);
}

#[test]
fn test_from_log_file_missing() {
    assert!(from_log_file("/nonexistent/app.log").is_err());
}

#[test]
fn test_parse_json_lines() {
    let content = r#"
{"sql": "SELECT * FROM users WHERE id = 1", "duration": 0.25, "call_site": "app/views.py:10"}
{"sql": "COMMIT", "duration": 0.001}
"#;
    let captures = parse_json_lines(content);
    assert_eq!(captures.len(), 2);
    assert_eq!(captures[0].duration, 0.25);
    assert_eq!(captures[0].call_site.as_deref(), Some("app/views.py:10"));
    assert!(captures[1].call_site.is_none());
    // Missing timestamps are stamped at parse time.
    assert!(captures[1].timestamp.is_some());
}

#[test]
fn test_parse_json_lines_skips_unreadable() {
    let content = "{\"sql\": \"SELECT 1\", \"duration\": 0.1}\nnot json\n{broken\n";
    let captures = parse_json_lines(content);
    assert_eq!(captures.len(), 1);
}

#[test]
fn test_parse_json_lines_keeps_explicit_timestamp() {
    let content =
        r#"{"sql": "SELECT 1", "duration": 0.1, "timestamp": "2026-01-02T03:04:05Z"}"#;
    let captures = parse_json_lines(content);
    assert_eq!(captures.len(), 1);
    assert_eq!(
        captures[0].timestamp.unwrap().to_rfc3339(),
        "2026-01-02T03:04:05+00:00"
    );
}

#[test]
fn test_from_sql_strings() {
    let captures = from_sql_strings(&[
        "  SELECT 1  ".to_string(),
        "COMMIT".to_string(),
    ]);
    assert_eq!(captures.len(), 2);
    assert_eq!(captures[0].sql, "SELECT 1");
    assert_eq!(captures[0].duration, 0.01);
}
