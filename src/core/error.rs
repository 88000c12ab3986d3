//! Error types for dispatcher operations.

use thiserror::Error;

use crate::util::serde::WorkerId;

/// Errors produced by dispatcher components.
///
/// Terminal per-event outcomes (rate limited, no capacity, failed over) are
/// not errors; they are carried in `DispatchOutcome.status`. This enum covers
/// component faults only.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A worker id was not found in the configured topology.
    #[error("unknown worker: {0}")]
    UnknownWorker(WorkerId),
    /// The event log writer has shut down and no longer accepts records.
    #[error("event log closed")]
    LogClosed,
    /// Underlying I/O failure (sink creation, flush).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single delivery attempt against a worker.
///
/// Returned by `WorkerClient` implementations; the dispatcher translates these
/// into failover retries and health-state transitions.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The worker could not be reached at its address.
    #[error("worker unreachable: {0}")]
    Unreachable(String),
    /// The worker answered with a non-success status.
    #[error("worker returned status {0}")]
    Status(u16),
    /// The attempt exceeded the configured delivery timeout.
    #[error("delivery timed out")]
    Timeout,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
