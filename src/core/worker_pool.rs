//! Worker pool with per-worker health tracking and half-open revival.
//!
//! The pool owns the static worker topology and every worker's mutable health
//! fields. Health transitions follow a total table:
//!
//! ```text
//! HEALTHY --failure--> SUSPECT --max_fails within fail_timeout--> DOWN
//! SUSPECT --success--> HEALTHY
//! DOWN    --fail_timeout elapsed since last failure--> SUSPECT (half-open)
//! SUSPECT (half-open) --failure--> DOWN (immediately, no fresh streak)
//! ```
//!
//! Workers are never removed at runtime; DOWN is always recoverable.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::error::DispatchError;
use crate::util::serde::WorkerId;

/// Health of a worker as seen by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthState {
    /// Accepting traffic, no recent failures.
    Healthy,
    /// Accepting traffic, but failing recently or on a half-open probe.
    Suspect,
    /// Excluded from selection until revived.
    Down,
}

impl HealthState {
    /// Whether a worker in this state is eligible for selection.
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Down)
    }
}

/// Static identity of a backend worker instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Stable identifier, unique within the topology.
    pub id: WorkerId,
    /// Delivery address (opaque to the pool).
    pub address: String,
}

impl Worker {
    /// Build a worker identity.
    pub fn new(id: impl Into<WorkerId>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
        }
    }
}

/// Per-worker health snapshot for the external front door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerHealth {
    /// Worker identifier.
    pub id: WorkerId,
    /// Current health state.
    pub state: HealthState,
}

/// Mutable health fields, guarded by the slot's mutex.
#[derive(Debug)]
struct WorkerState {
    state: HealthState,
    consecutive_failures: u32,
    /// Start of the current failure streak, if one is open.
    streak_started_ms: Option<u128>,
    /// Most recent failure; gates revival while DOWN.
    last_failure_ms: Option<u128>,
    /// Set while on a half-open probe after revival.
    probing: bool,
}

impl WorkerState {
    const fn new() -> Self {
        Self {
            state: HealthState::Healthy,
            consecutive_failures: 0,
            streak_started_ms: None,
            last_failure_ms: None,
            probing: false,
        }
    }
}

struct WorkerSlot {
    worker: Worker,
    state: Mutex<WorkerState>,
}

/// Tracks worker identities, health state, and failure counters; exposes the
/// live-worker set in fixed configured order.
///
/// Each worker's health fields sit behind their own mutex, so transitions on
/// different workers never contend with each other.
pub struct WorkerPool {
    slots: Vec<WorkerSlot>,
    index: HashMap<WorkerId, usize>,
    max_fails: u32,
    fail_timeout_ms: u128,
}

impl WorkerPool {
    /// Build a pool from a static topology.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidConfig` if the topology is empty or
    /// contains duplicate worker ids.
    pub fn new(
        workers: Vec<Worker>,
        max_fails: u32,
        fail_timeout_ms: u128,
    ) -> Result<Self, DispatchError> {
        if workers.is_empty() {
            return Err(DispatchError::InvalidConfig(
                "worker topology must not be empty".into(),
            ));
        }
        let mut index = HashMap::with_capacity(workers.len());
        for (i, w) in workers.iter().enumerate() {
            if index.insert(w.id.clone(), i).is_some() {
                return Err(DispatchError::InvalidConfig(format!(
                    "duplicate worker id: {}",
                    w.id
                )));
            }
        }
        let slots = workers
            .into_iter()
            .map(|worker| WorkerSlot {
                worker,
                state: Mutex::new(WorkerState::new()),
            })
            .collect();
        Ok(Self {
            slots,
            index,
            max_fails,
            fail_timeout_ms,
        })
    }

    /// Number of workers in the configured topology, live or not.
    #[must_use]
    pub fn topology_len(&self) -> usize {
        self.slots.len()
    }

    /// Workers with state != DOWN, in fixed configured order.
    #[must_use]
    pub fn live_workers(&self) -> Vec<Worker> {
        self.slots
            .iter()
            .filter(|s| s.state.lock().state.is_live())
            .map(|s| s.worker.clone())
            .collect()
    }

    /// Count of live workers.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state.lock().state.is_live())
            .count()
    }

    /// The worker at a topology position if it is currently live.
    ///
    /// Used by the scheduler's rotation scan; DOWN workers yield `None`.
    pub(crate) fn candidate(&self, idx: usize) -> Option<Worker> {
        let slot = self.slots.get(idx)?;
        if slot.state.lock().state.is_live() {
            Some(slot.worker.clone())
        } else {
            None
        }
    }

    /// Record a failed delivery attempt against a worker.
    ///
    /// A failure opens or extends the current streak; reaching `max_fails`
    /// failures within `fail_timeout` of the streak start transitions the
    /// worker to DOWN. A failure during a half-open probe goes straight back
    /// to DOWN. A failure while already DOWN refreshes `last_failure_ms` so
    /// revival waits for a quiet timeout window.
    ///
    /// Returns the worker's state after the transition.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnknownWorker` for ids outside the topology.
    pub fn mark_failure(&self, id: &WorkerId, now_ms: u128) -> Result<HealthState, DispatchError> {
        let slot = self.slot(id)?;
        let mut st = slot.state.lock();

        if st.state == HealthState::Down {
            st.last_failure_ms = Some(now_ms);
            return Ok(HealthState::Down);
        }

        if st.probing {
            // Half-open probe failed: straight back to DOWN.
            st.state = HealthState::Down;
            st.probing = false;
            st.consecutive_failures = 0;
            st.streak_started_ms = None;
            st.last_failure_ms = Some(now_ms);
            warn!(worker = %id, "half-open probe failed, worker DOWN again");
            return Ok(HealthState::Down);
        }

        // Open a fresh streak if none exists or the current one went stale.
        let streak_start = match st.streak_started_ms {
            Some(start) if now_ms.saturating_sub(start) <= self.fail_timeout_ms => start,
            _ => {
                st.streak_started_ms = Some(now_ms);
                st.consecutive_failures = 0;
                now_ms
            }
        };
        st.consecutive_failures += 1;
        st.last_failure_ms = Some(now_ms);

        if st.state == HealthState::Healthy {
            st.state = HealthState::Suspect;
            info!(worker = %id, "worker SUSPECT after failure");
        }

        if st.consecutive_failures >= self.max_fails
            && now_ms.saturating_sub(streak_start) <= self.fail_timeout_ms
        {
            st.state = HealthState::Down;
            st.streak_started_ms = None;
            warn!(
                worker = %id,
                failures = st.consecutive_failures,
                "failure threshold reached, worker DOWN"
            );
        }
        Ok(st.state)
    }

    /// Record a successful delivery: resets the failure streak and promotes
    /// SUSPECT back to HEALTHY (closing any half-open probe).
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnknownWorker` for ids outside the topology.
    pub fn mark_success(&self, id: &WorkerId) -> Result<(), DispatchError> {
        let slot = self.slot(id)?;
        let mut st = slot.state.lock();
        st.consecutive_failures = 0;
        st.streak_started_ms = None;
        if st.state == HealthState::Suspect {
            st.state = HealthState::Healthy;
            if st.probing {
                info!(worker = %id, "half-open probe succeeded, worker HEALTHY");
            }
        }
        st.probing = false;
        Ok(())
    }

    /// Promote DOWN workers whose `fail_timeout` has elapsed since their last
    /// failure to SUSPECT in half-open mode. Idempotent; safe to run
    /// periodically and concurrently. Returns the number of workers revived.
    pub fn revive_if_due(&self, now_ms: u128) -> usize {
        let mut revived = 0;
        for slot in &self.slots {
            let mut st = slot.state.lock();
            if st.state != HealthState::Down {
                continue;
            }
            let due = st
                .last_failure_ms
                .map_or(true, |t| now_ms.saturating_sub(t) >= self.fail_timeout_ms);
            if due {
                st.state = HealthState::Suspect;
                st.probing = true;
                st.consecutive_failures = 0;
                st.streak_started_ms = None;
                revived += 1;
                info!(worker = %slot.worker.id, "worker revived to SUSPECT (half-open)");
            } else {
                debug!(worker = %slot.worker.id, "worker still in fail timeout");
            }
        }
        revived
    }

    /// Per-worker `{id, state}` snapshot for the external front door.
    #[must_use]
    pub fn health_report(&self) -> Vec<WorkerHealth> {
        self.slots
            .iter()
            .map(|s| WorkerHealth {
                id: s.worker.id.clone(),
                state: s.state.lock().state,
            })
            .collect()
    }

    fn slot(&self, id: &WorkerId) -> Result<&WorkerSlot, DispatchError> {
        self.index
            .get(id)
            .map(|&i| &self.slots[i])
            .ok_or_else(|| DispatchError::UnknownWorker(id.clone()))
    }
}
