//! Priority-aware round-robin worker selection.
//!
//! Fairness is global: one rotating cursor over the configured worker order,
//! shared by every priority class. Priority only decides which events of a
//! batch reach the scheduler first ([`order_batch`]); it never biases which
//! worker an individual event lands on.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::core::event::Event;
use crate::core::rate_limiter::RateLimiter;
use crate::core::worker_pool::{Worker, WorkerPool};
use crate::util::serde::WorkerId;

/// Result of one scheduler pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    /// A live worker admitted the event; its window was charged.
    Admitted(Worker),
    /// Every eligible live worker's window is full.
    RateLimited,
    /// No eligible live worker exists.
    NoCapacity,
}

/// Selects the next worker for an event using round robin over the live set,
/// consulting the rate limiter and skipping excluded workers.
///
/// The rotation cursor is owned here and only ever touched under its mutex,
/// which is held for the whole `pick`: concurrent picks cannot admit past a
/// worker's rate budget, and the cursor advances exactly once per pick.
pub struct PriorityRoundRobinScheduler {
    pool: Arc<WorkerPool>,
    limiter: Arc<RateLimiter>,
    cursor: Mutex<usize>,
}

impl PriorityRoundRobinScheduler {
    /// Build a scheduler over a pool and limiter.
    pub fn new(pool: Arc<WorkerPool>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            pool,
            limiter,
            cursor: Mutex::new(0),
        }
    }

    /// Pick a worker for an event at `now_ms`.
    ///
    /// Scans live workers in rotation order starting at the cursor, at most
    /// once around. A rate-limited candidate is skipped, not failed; the skip
    /// never touches health counters. Workers in `exclude` (the
    /// ones that already failed this submission) are passed over entirely.
    /// When a full rotation admits nothing, the cursor still advances by one
    /// position so repeated saturation carries no bias toward the first
    /// worker.
    pub fn pick(&self, now_ms: u128, exclude: &[WorkerId]) -> Pick {
        let n = self.pool.topology_len();
        let mut cursor = self.cursor.lock();

        let mut saw_candidate = false;
        for offset in 0..n {
            let idx = (*cursor + offset) % n;
            let Some(worker) = self.pool.candidate(idx) else {
                continue;
            };
            if exclude.contains(&worker.id) {
                continue;
            }
            saw_candidate = true;
            if self.limiter.try_admit(&worker.id, now_ms) {
                *cursor = (idx + 1) % n;
                return Pick::Admitted(worker);
            }
            debug!(worker = %worker.id, "candidate rate-limited, rotating on");
        }

        *cursor = (*cursor + 1) % n;
        if saw_candidate {
            Pick::RateLimited
        } else {
            Pick::NoCapacity
        }
    }

    /// The limiter this scheduler consults.
    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

/// Order a batch of events for dispatch: ascending priority value (urgent
/// first), stable within equal priority so arrival order breaks ties.
pub fn order_batch(events: &mut [Event]) {
    events.sort_by_key(|e| e.priority);
}
