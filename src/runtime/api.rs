//! API-facing request/response models and log reporting helpers.
//!
//! Reporting functions are pure views over an event-log snapshot; they
//! tolerate the log growing while being read because a snapshot is always a
//! consistent prefix of completed appends.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::dispatcher::{Dispatcher, WorkerClient};
use crate::core::error::DispatchError;
use crate::core::event::{DispatchOutcome, Event, EventType};
use crate::core::worker_pool::{WorkerHealth, WorkerPool};
use crate::util::serde::{Priority, ResourceRequest, WorkerId};

/// Event submission payload from an external source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSubmission {
    /// Event kind.
    pub event_type: EventType,
    /// Collection the workload belongs to.
    pub collection_id: String,
    /// Requested CPU units.
    pub cpus: f64,
    /// Requested memory units.
    pub memory: f64,
    /// Urgency, 0 (most urgent) through 11.
    pub priority: u8,
}

impl EventSubmission {
    /// Validate and convert into an [`Event`].
    ///
    /// # Errors
    ///
    /// Returns a description when the priority or resource request is out of
    /// range.
    pub fn into_event(self) -> Result<Event, String> {
        let priority = Priority::new(self.priority)
            .ok_or_else(|| format!("priority {} out of range 0..=11", self.priority))?;
        let resources = ResourceRequest::new(self.cpus, self.memory)
            .ok_or_else(|| "resource request components must be finite and >= 0".to_string())?;
        Ok(Event::new(
            self.event_type,
            self.collection_id,
            resources,
            priority,
        ))
    }
}

/// Health response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Return a health payload.
#[must_use]
pub const fn health() -> Health {
    Health { ok: true }
}

/// Per-worker health states for the external front door.
#[must_use]
pub fn health_report(pool: &WorkerPool) -> Vec<WorkerHealth> {
    pool.health_report()
}

/// Validate a submission and dispatch it.
///
/// # Errors
///
/// Returns the validation message or dispatch fault as a string, mirroring
/// what an HTTP edge would surface.
pub async fn submit_event<C: WorkerClient>(
    dispatcher: &Dispatcher<C>,
    submission: EventSubmission,
) -> Result<DispatchOutcome, String> {
    let event = submission.into_event()?;
    dispatcher
        .submit(event)
        .await
        .map_err(|e: DispatchError| e.to_string())
}

/// Aggregate metrics over a log snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// Total outcome records.
    pub total_events: usize,
    /// Records that reached a worker.
    pub delivered: usize,
    /// Delivered share of total, percent rounded to one decimal.
    pub success_rate: f64,
    /// Mean requested CPU units.
    pub avg_cpu: f64,
    /// Mean requested memory units.
    pub avg_memory: f64,
    /// Mean priority value.
    pub avg_priority: f64,
}

/// Compute aggregate metrics over a log snapshot.
#[must_use]
pub fn metrics_summary(records: &[DispatchOutcome]) -> MetricsSummary {
    let total = records.len();
    if total == 0 {
        return MetricsSummary {
            total_events: 0,
            delivered: 0,
            success_rate: 0.0,
            avg_cpu: 0.0,
            avg_memory: 0.0,
            avg_priority: 0.0,
        };
    }
    let delivered = records.iter().filter(|r| r.status.is_delivered()).count();
    #[allow(clippy::cast_precision_loss)]
    let total_f = total as f64;
    #[allow(clippy::cast_precision_loss)]
    let delivered_f = delivered as f64;
    let avg = |f: fn(&DispatchOutcome) -> f64| records.iter().map(f).sum::<f64>() / total_f;
    MetricsSummary {
        total_events: total,
        delivered,
        success_rate: round1(delivered_f / total_f * 100.0),
        avg_cpu: avg(|r| r.event.resources.cpus),
        avg_memory: avg(|r| r.event.resources.memory),
        avg_priority: round1(avg(|r| f64::from(r.event.priority.value()))),
    }
}

/// Outcome count per event type; kinds that never occurred report zero.
#[must_use]
pub fn event_distribution(records: &[DispatchOutcome]) -> HashMap<EventType, usize> {
    let mut counts: HashMap<EventType, usize> =
        EventType::ALL.iter().map(|&t| (t, 0)).collect();
    for r in records {
        *counts.entry(r.event.event_type).or_insert(0) += 1;
    }
    counts
}

/// Outcome count per priority value.
#[must_use]
pub fn priority_distribution(records: &[DispatchOutcome]) -> HashMap<u8, usize> {
    let mut counts = HashMap::new();
    for r in records {
        *counts.entry(r.event.priority.value()).or_insert(0) += 1;
    }
    counts
}

/// Delivered-outcome count per assigned worker.
#[must_use]
pub fn worker_load(records: &[DispatchOutcome]) -> HashMap<WorkerId, usize> {
    let mut counts = HashMap::new();
    for r in records {
        if let Some(worker) = &r.assigned_worker {
            *counts.entry(worker.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// The last `n` outcome records, oldest first.
#[must_use]
pub fn recent_traces(records: &[DispatchOutcome], n: usize) -> &[DispatchOutcome] {
    let start = records.len().saturating_sub(n);
    &records[start..]
}

/// Records assigned to one worker.
#[must_use]
pub fn filter_by_worker<'a>(
    records: &'a [DispatchOutcome],
    worker: &WorkerId,
) -> Vec<&'a DispatchOutcome> {
    records
        .iter()
        .filter(|r| r.assigned_worker.as_ref() == Some(worker))
        .collect()
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
