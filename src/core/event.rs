//! Workload event and dispatch outcome models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::serde::{CollectionId, Priority, ResourceRequest, WorkerId};

/// Kind of a cluster workload event, as carried in trace records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A workload was submitted to the cluster.
    Submit,
    /// A workload was placed on a machine.
    Schedule,
    /// A workload was evicted from its machine.
    Evict,
    /// A workload failed.
    Fail,
    /// A workload finished normally.
    Finish,
    /// A workload was killed by its owner.
    Kill,
    /// A workload's constraints were updated.
    Update,
}

impl EventType {
    /// Stable uppercase name, matching the trace encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "SUBMIT",
            Self::Schedule => "SCHEDULE",
            Self::Evict => "EVICT",
            Self::Fail => "FAIL",
            Self::Finish => "FINISH",
            Self::Kill => "KILL",
            Self::Update => "UPDATE",
        }
    }

    /// All event kinds, in trace order. Used by reporting to emit zero counts
    /// for kinds that never occurred.
    pub const ALL: [Self; 7] = [
        Self::Submit,
        Self::Schedule,
        Self::Evict,
        Self::Fail,
        Self::Finish,
        Self::Kill,
        Self::Update,
    ];
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable cluster workload event.
///
/// Created when read from the external source, dispatched once, and discarded
/// after its outcome is logged. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// What happened to the workload.
    pub event_type: EventType,
    /// Collection the workload belongs to.
    pub collection_id: CollectionId,
    /// Requested CPU and memory units.
    pub resources: ResourceRequest,
    /// Urgency; lower value is dispatched first within a batch.
    pub priority: Priority,
}

impl Event {
    /// Build an event from its components.
    pub fn new(
        event_type: EventType,
        collection_id: impl Into<CollectionId>,
        resources: ResourceRequest,
        priority: Priority,
    ) -> Self {
        Self {
            event_type,
            collection_id: collection_id.into(),
            resources,
            priority,
        }
    }
}

/// Terminal status of one dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    /// Admitted and delivered to the assigned worker.
    Admitted,
    /// Every live worker's admission window was full.
    RateLimited,
    /// Every attempted worker failed delivery.
    FailedOver,
    /// No live worker existed at pick time.
    RejectedNoCapacity,
}

impl OutcomeStatus {
    /// Whether the event reached a worker.
    #[must_use]
    pub const fn is_delivered(self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Result of one event's dispatch, appended to the event log exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Unique record identifier.
    pub outcome_id: Uuid,
    /// The dispatched event.
    pub event: Event,
    /// Worker that accepted delivery, if any.
    pub assigned_worker: Option<WorkerId>,
    /// Terminal status.
    pub status: OutcomeStatus,
    /// Total delivery attempts made, including the successful one.
    pub attempt_count: u32,
    /// When the outcome became final, milliseconds since epoch.
    pub timestamp_ms: u128,
}

impl DispatchOutcome {
    /// Build an outcome record with a fresh id.
    #[must_use]
    pub fn record(
        event: Event,
        assigned_worker: Option<WorkerId>,
        status: OutcomeStatus,
        attempt_count: u32,
        timestamp_ms: u128,
    ) -> Self {
        Self {
            outcome_id: Uuid::new_v4(),
            event,
            assigned_worker,
            status,
            attempt_count,
            timestamp_ms,
        }
    }
}
