//! Error display and conversion tests.

use cluster_dispatch::core::{DeliveryError, DispatchError};
use cluster_dispatch::util::serde::WorkerId;

#[test]
fn test_dispatch_error_display() {
    let err = DispatchError::InvalidConfig("rate_limit must be greater than 0".into());
    assert_eq!(
        err.to_string(),
        "invalid configuration: rate_limit must be greater than 0"
    );

    let err = DispatchError::UnknownWorker(WorkerId::new("ghost"));
    assert_eq!(err.to_string(), "unknown worker: ghost");

    let err = DispatchError::LogClosed;
    assert_eq!(err.to_string(), "event log closed");
}

#[test]
fn test_delivery_error_display() {
    assert_eq!(
        DeliveryError::Unreachable("connection refused".into()).to_string(),
        "worker unreachable: connection refused"
    );
    assert_eq!(DeliveryError::Status(500).to_string(), "worker returned status 500");
    assert_eq!(DeliveryError::Timeout.to_string(), "delivery timed out");
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: DispatchError = io.into();
    assert!(err.to_string().starts_with("i/o error"));
}
