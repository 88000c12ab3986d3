//! Configuration parsing and validation tests.

use cluster_dispatch::config::{DispatchConfig, WorkerConfig};

fn topology() -> Vec<WorkerConfig> {
    vec![
        WorkerConfig {
            id: "app1".into(),
            address: "http://localhost:5000".into(),
        },
        WorkerConfig {
            id: "app2".into(),
            address: "http://localhost:5001".into(),
        },
        WorkerConfig {
            id: "app3".into(),
            address: "http://localhost:5002".into(),
        },
    ]
}

#[test]
fn test_builder_setters() {
    let cfg = DispatchConfig::new(topology())
        .with_rate_limit(10)
        .with_window_secs(30)
        .with_max_fails(5)
        .with_fail_timeout_secs(60)
        .with_delivery_timeout_secs(2)
        .with_max_retries(2);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.rate_limit, 10);
    assert_eq!(cfg.window_secs, 30);
    assert_eq!(cfg.max_fails, 5);
    assert_eq!(cfg.fail_timeout_secs, 60);
    assert_eq!(cfg.delivery_timeout_secs, 2);
    assert_eq!(cfg.max_retries, Some(2));
}

#[test]
fn test_json_round_trip() {
    let cfg = DispatchConfig::new(topology()).with_rate_limit(42);
    let json = serde_json::to_string(&cfg).unwrap();
    let back = DispatchConfig::from_json_str(&json).unwrap();
    assert_eq!(back.rate_limit, 42);
    assert_eq!(back.workers, topology());
}

#[test]
fn test_full_json_document() {
    let cfg = DispatchConfig::from_json_str(
        r#"{
            "workers": [
                {"id": "app1", "address": "http://localhost:5000"},
                {"id": "app2", "address": "http://localhost:5001"},
                {"id": "app3", "address": "http://localhost:5002"}
            ],
            "rate_limit": 500,
            "window_secs": 60,
            "max_fails": 3,
            "fail_timeout_secs": 30,
            "delivery_timeout_secs": 5
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.workers.len(), 3);
    assert_eq!(cfg.max_retries, None);
}

#[test]
fn test_invalid_documents_rejected() {
    // Garbage.
    assert!(DispatchConfig::from_json_str("not json").is_err());
    // Valid JSON, empty topology.
    assert!(DispatchConfig::from_json_str(r#"{"workers": []}"#).is_err());
    // Zero tunable.
    let err = DispatchConfig::from_json_str(
        r#"{
            "workers": [{"id": "a", "address": "x"}],
            "max_fails": 0
        }"#,
    )
    .unwrap_err();
    assert!(err.contains("max_fails"));
}
