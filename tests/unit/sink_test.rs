//! Event log and sink wiring tests.

use cluster_dispatch::core::{DispatchOutcome, Event, EventLog, EventType, OutcomeStatus};
use cluster_dispatch::infra::sink::JsonlSink;
use cluster_dispatch::util::serde::{Priority, ResourceRequest, WorkerId};

fn outcome(collection: &str) -> DispatchOutcome {
    let event = Event::new(
        EventType::Evict,
        collection,
        ResourceRequest::new(1.0, 2.0).unwrap(),
        Priority::new(7).unwrap(),
    );
    DispatchOutcome::record(
        event,
        Some(WorkerId::new("app2")),
        OutcomeStatus::Admitted,
        1,
        123,
    )
}

#[test]
fn test_event_log_to_jsonl_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dispatch.jsonl");

    let sink = JsonlSink::open(&path).unwrap();
    let log = EventLog::with_sink(Box::new(sink));
    for i in 0..5 {
        log.append(outcome(&format!("col-{i}"))).unwrap();
    }
    log.close();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 5);

    // Records parse back and retain append order.
    for (i, line) in lines.iter().enumerate() {
        let record: DispatchOutcome = serde_json::from_str(line).unwrap();
        assert_eq!(record.event.collection_id.0, format!("col-{i}"));
        assert_eq!(record.status, OutcomeStatus::Admitted);
    }

    // The in-memory log stays authoritative alongside the file.
    assert_eq!(log.len(), 5);
}

#[test]
fn test_snapshot_is_prefix_under_growth() {
    let log = EventLog::new();
    for i in 0..50 {
        log.append(outcome(&format!("col-{i}"))).unwrap();
    }
    let early = log.snapshot();
    log.flush().unwrap();
    let full = log.snapshot();

    // Whatever the writer had sequenced at snapshot time is a prefix of the
    // final log.
    assert!(early.len() <= full.len());
    assert_eq!(full.len(), 50);
    assert_eq!(&full[..early.len()], &early[..]);
}
