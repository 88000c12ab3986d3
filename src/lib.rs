//! # Cluster Dispatch
//!
//! A priority-aware dispatch and admission-control layer for cluster
//! workload event streams.
//!
//! This library ingests trace-derived workload events (event type, collection
//! id, resource request, priority) and dispatches each one to a backend
//! worker instance: balancing load with round robin, tolerating worker
//! failure with health tracking and failover, enforcing a per-worker
//! sliding-window rate limit, and recording an auditable, ordered log entry
//! for every admitted or rejected event.
//!
//! ## Core Problem Solved
//!
//! Replaying cluster traces against live backends has constraints a plain
//! load balancer does not cover:
//!
//! - **Admission budgets**: each backend tolerates a bounded request rate;
//!   overshooting corrupts the replay's timing fidelity
//! - **Flaky backends**: a worker that starts failing must be failed over
//!   quickly, then probed carefully before it is trusted again
//! - **Auditability**: every event needs exactly one ordered outcome record
//!   for downstream reporting, whatever its fate
//!
//! ## Key Features
//!
//! - **Priority-Aware Round Robin**: one global rotation cursor for fairness;
//!   priority orders events within a batch, never worker preference
//! - **Sliding-Window Rate Limiting**: per-worker admission caps over a
//!   trailing interval, not calendar buckets
//! - **Health State Machine**: HEALTHY → SUSPECT → DOWN with half-open
//!   revival probes after a fail timeout
//! - **Failover**: delivery failures retry against the next eligible worker
//!   within the same submission
//! - **Append-Only Event Log**: multiplexed producers feed one sequential
//!   writer; readers always see a consistent prefix
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cluster_dispatch::builders::build_dispatcher;
//! use cluster_dispatch::config::{DispatchConfig, WorkerConfig};
//! use cluster_dispatch::core::{Event, EventType};
//! use cluster_dispatch::util::serde::{Priority, ResourceRequest};
//!
//! let cfg = DispatchConfig::new(vec![
//!     WorkerConfig { id: "app1".into(), address: "http://localhost:5000".into() },
//!     WorkerConfig { id: "app2".into(), address: "http://localhost:5001".into() },
//! ])
//! .with_rate_limit(500);
//!
//! let dispatcher = build_dispatcher(&cfg, my_client, None)?;
//!
//! let event = Event::new(
//!     EventType::Schedule,
//!     "collection-42",
//!     ResourceRequest::new(0.5, 0.25).unwrap(),
//!     Priority::new(2).unwrap(),
//! );
//! let outcome = dispatcher.submit(event).await?;
//! println!("dispatched: {:?}", outcome.status);
//! ```
//!
//! For complete examples, see `tests/dispatch_flow_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core dispatch, scheduling, and admission-control components.
pub mod core;
/// Configuration models for the dispatcher and worker topology.
pub mod config;
/// Builders to construct a dispatcher from configuration.
pub mod builders;
/// Infrastructure adapters for outcome persistence backends.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
