//! Dispatcher builder tests.

use async_trait::async_trait;

use cluster_dispatch::builders::build_dispatcher;
use cluster_dispatch::config::{DispatchConfig, WorkerConfig};
use cluster_dispatch::core::{DeliveryError, DispatchError, Event, Worker, WorkerClient};
use cluster_dispatch::core::{EventType, OutcomeStatus};
use cluster_dispatch::infra::sink::InMemorySink;
use cluster_dispatch::runtime::api::{submit_event, EventSubmission};
use cluster_dispatch::util::serde::{Priority, ResourceRequest};

#[derive(Clone)]
struct OkClient;

#[async_trait]
impl WorkerClient for OkClient {
    async fn deliver(&self, _worker: &Worker, _event: &Event) -> Result<(), DeliveryError> {
        Ok(())
    }
}

fn config() -> DispatchConfig {
    DispatchConfig::new(vec![
        WorkerConfig {
            id: "app1".into(),
            address: "http://localhost:5000".into(),
        },
        WorkerConfig {
            id: "app2".into(),
            address: "http://localhost:5001".into(),
        },
    ])
}

#[test]
fn test_build_rejects_invalid_config() {
    let cfg = config().with_rate_limit(0);
    let result = build_dispatcher(&cfg, OkClient, None);
    assert!(matches!(result, Err(DispatchError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_built_dispatcher_dispatches() {
    let cfg = config().with_rate_limit(10);
    let dispatcher = build_dispatcher(&cfg, OkClient, None).unwrap();

    let event = Event::new(
        EventType::Submit,
        "col-1",
        ResourceRequest::new(0.5, 0.5).unwrap(),
        Priority::highest(),
    );
    let outcome = dispatcher.submit(event).await.unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Admitted);
    assert_eq!(dispatcher.pool().live_count(), 2);
}

#[tokio::test]
async fn test_submit_event_api() {
    let dispatcher = build_dispatcher(&config(), OkClient, None).unwrap();

    let outcome = submit_event(
        &dispatcher,
        EventSubmission {
            event_type: EventType::Update,
            collection_id: "col-api".into(),
            cpus: 0.25,
            memory: 0.5,
            priority: 1,
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Admitted);

    // Out-of-range priority surfaces as a validation message.
    let err = submit_event(
        &dispatcher,
        EventSubmission {
            event_type: EventType::Update,
            collection_id: "col-api".into(),
            cpus: 0.25,
            memory: 0.5,
            priority: 42,
        },
    )
    .await
    .unwrap_err();
    assert!(err.contains("out of range"));
}

#[tokio::test]
async fn test_built_dispatcher_wires_sink() {
    let sink = InMemorySink::new(16);
    let handle = sink.handle();
    let cfg = config();
    let dispatcher = build_dispatcher(&cfg, OkClient, Some(Box::new(sink))).unwrap();

    let event = Event::new(
        EventType::Finish,
        "col-2",
        ResourceRequest::ZERO,
        Priority::lowest(),
    );
    dispatcher.submit(event).await.unwrap();
    dispatcher.log().flush().unwrap();

    let seen = handle.events();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].event.collection_id.0, "col-2");
}
