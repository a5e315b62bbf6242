//! End-to-end runs through the fan-out, classification, and rendering
//! pipeline with scripted drivers.

use std::io;
use std::path::Path;

use netbak::errors::OpError;
use netbak::executor::{FanOut, OpFuture, OpOutcome, SessionLimit};
use netbak::inventory::Record;
use netbak::report::{collect_outcomes, Report, ALL_CREDENTIALS_FAILED, FAILURES_CSV};
use nix::errno::Errno;

async fn run(ops: Vec<(OpFuture<OpOutcome>, Record)>, dir: &Path) -> (Report, String) {
    let fanout = FanOut::new(SessionLimit::Unbounded);
    let mut report = Report::new();

    report.start_timing();
    let completions = fanout.drain(ops);
    collect_outcomes(completions, &mut report).await;
    report.stop_timing();

    let mut out = Vec::new();
    report.render(&mut out, dir).unwrap();
    (report, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_all_backups_succeed() {
    let dir = tempfile::tempdir().unwrap();

    let ops: Vec<(OpFuture<OpOutcome>, Record)> = (1..=3)
        .map(|n| {
            let op: OpFuture<OpOutcome> =
                Box::pin(async move { Ok(OpOutcome::passed(format!("configs/sw{n}.cfg"))) });
            (op, Record::new(format!("sw{n}"), "ios"))
        })
        .collect();

    let (report, text) = run(ops, dir.path()).await;

    assert_eq!(report.total(), 3);
    assert!(text.contains("Summary: TOTAL=3, OK=3, FAIL=0"));
    assert!(!dir.path().join(FAILURES_CSV).exists());
}

#[tokio::test]
async fn test_mixed_failures_are_classified_and_exported() {
    let dir = tempfile::tempdir().unwrap();

    let ok: OpFuture<OpOutcome> = Box::pin(async { Ok(OpOutcome::passed("configs/sw1.cfg")) });
    let timed_out: OpFuture<OpOutcome> = Box::pin(async { Err(OpError::timeout()) });
    let refused: OpFuture<OpOutcome> = Box::pin(async {
        Err(OpError::Io(io::Error::from_raw_os_error(
            Errno::ECONNREFUSED as i32,
        )))
    });

    let ops = vec![
        (ok, Record::new("sw1", "ios")),
        (timed_out, Record::new("sw2", "eos")),
        (refused, Record::new("sw3", "junos")),
    ];

    let (report, text) = run(ops, dir.path()).await;

    assert_eq!(report.total(), 3);
    assert!(text.contains("Summary: TOTAL=3, OK=1, FAIL=2"));

    let mut reader = csv::Reader::from_path(dir.path().join(FAILURES_CSV)).unwrap();
    assert_eq!(
        reader.headers().unwrap(),
        &csv::StringRecord::from(vec!["host", "os_name", "reason"])
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    let reasons: Vec<&str> = rows.iter().filter_map(|r| r.get(2)).collect();
    assert!(reasons.contains(&"TIMEOUT"));
    assert!(reasons.contains(&"ECONNREFUSED"));
}

#[tokio::test]
async fn test_rejected_credentials_are_a_policy_failure() {
    let dir = tempfile::tempdir().unwrap();

    let no_match: OpFuture<OpOutcome> = Box::pin(async { Ok(OpOutcome::NoCredentials) });
    let ops = vec![(no_match, Record::new("sw1", "ios"))];

    let (report, _text) = run(ops, dir.path()).await;

    assert_eq!(report.fail_count(), 1);
    let (record, reason) = report.failures().next().unwrap();
    assert_eq!(record.host, "sw1");
    assert_eq!(reason, ALL_CREDENTIALS_FAILED);
}
