use std::path::Path;

use netbak::inventory::Record;
use netbak::report::{Report, FAILURES_CSV};

#[test]
fn test_render_before_start_is_an_error() {
    let mut report = Report::new();
    let mut out = Vec::new();
    assert!(report.render(&mut out, Path::new(".")).is_err());
}

#[test]
fn test_duration_before_start_is_an_error() {
    let report = Report::new();
    assert!(report.duration().is_err());
}

#[test]
fn test_render_finalizes_timing_when_needed() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = Report::new();
    report.start_timing();
    report.record_success(Record::new("sw1", "ios"), "ok");

    // No explicit stop_timing; render must finalize on its own.
    let mut out = Vec::new();
    report.render(&mut out, dir.path()).unwrap();
    assert!(report.duration().unwrap().as_secs_f64() >= 0.0);
}

#[test]
fn test_summary_line_layout() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = Report::new();
    report.start_timing();
    for n in 0..3 {
        report.record_success(Record::new(format!("sw{n}"), "ios"), "ok");
    }
    report.stop_timing();

    let mut out = Vec::new();
    report.render(&mut out, dir.path()).unwrap();
    let text = String::from_utf8(out).unwrap();

    let separator = format!("# {}", "-".repeat(78));
    assert_eq!(separator.len(), 80);
    assert!(text.contains(&separator));
    assert!(text.contains("Summary: TOTAL=3, OK=3, FAIL=0"));
    assert!(text.contains("START="));
    assert!(text.contains("STOP="));
    assert!(text.contains("DURATION="));
    assert!(text.contains(" AM") || text.contains(" PM"));
}

#[test]
fn test_no_csv_is_written_without_failures() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = Report::new();
    report.start_timing();
    report.record_success(Record::new("sw1", "ios"), "ok");

    let mut out = Vec::new();
    report.render(&mut out, dir.path()).unwrap();

    assert!(!dir.path().join(FAILURES_CSV).exists());
}

#[test]
fn test_failures_csv_has_header_and_rows_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = Report::new();
    report.start_timing();
    report.record_failure(Record::new("sw1", "ios"), "TIMEOUT");
    report.record_failure(Record::new("sw2", "eos"), "ECONNREFUSED");

    let mut out = Vec::new();
    report.render(&mut out, dir.path()).unwrap();

    let csv_path = dir.path().join(FAILURES_CSV);
    let content = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "host,os_name,reason");
    assert_eq!(lines[1], "sw1,ios,TIMEOUT");
    assert_eq!(lines[2], "sw2,eos,ECONNREFUSED");
    assert_eq!(lines.len(), 3);

    // The failure table accompanies the CSV in the rendered output.
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("TIMEOUT"));
    assert!(text.contains("ECONNREFUSED"));
}

#[test]
fn test_rerender_overwrites_the_csv() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = Report::new();
    report.start_timing();
    report.record_failure(Record::new("sw1", "ios"), "TIMEOUT");

    let mut out = Vec::new();
    report.render(&mut out, dir.path()).unwrap();
    report.render(&mut out, dir.path()).unwrap();

    let content = std::fs::read_to_string(dir.path().join(FAILURES_CSV)).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[test]
fn test_reasons_with_commas_are_quoted() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = Report::new();
    report.start_timing();
    report.record_failure(Record::new("sw1", "ios"), "Ssh: bad banner, closing");

    let mut out = Vec::new();
    report.render(&mut out, dir.path()).unwrap();

    let content = std::fs::read_to_string(dir.path().join(FAILURES_CSV)).unwrap();
    assert!(content.contains("\"Ssh: bad banner, closing\""));
}
