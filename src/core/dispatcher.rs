//! Per-event dispatch orchestration: pick, deliver, fail over, log.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::core::error::{DeliveryError, DispatchError};
use crate::core::event::{DispatchOutcome, Event, OutcomeStatus};
use crate::core::event_log::EventLog;
use crate::core::scheduler::{order_batch, Pick, PriorityRoundRobinScheduler};
use crate::core::worker_pool::{Worker, WorkerPool};
use crate::util::clock::now_ms;
use crate::util::serde::WorkerId;

/// Abstraction for delivering one event to one worker.
///
/// The library ships no network client; callers supply the transport and
/// tests supply mocks. An implementation should return promptly on failure;
/// the dispatcher wraps every attempt in the configured delivery timeout and
/// abandons attempts that exceed it.
#[async_trait]
pub trait WorkerClient: Send + Sync + 'static {
    /// Attempt delivery of `event` to `worker`.
    async fn deliver(&self, worker: &Worker, event: &Event) -> Result<(), DeliveryError>;
}

/// Abstraction for spawning background work on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Stop handle for the background revival loop.
///
/// Dropping the handle does not stop the loop; call [`ReviverHandle::stop`].
pub struct ReviverHandle {
    stop: Arc<AtomicBool>,
}

impl ReviverHandle {
    /// Signal the revival loop to exit after its current sleep.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }
}

/// Orchestrates one event's lifecycle: classify, pick a target, attempt
/// delivery, retry/failover on error, and append exactly one outcome record
/// to the event log.
pub struct Dispatcher<C: WorkerClient> {
    pool: Arc<WorkerPool>,
    scheduler: PriorityRoundRobinScheduler,
    client: C,
    log: Arc<EventLog>,
    delivery_timeout: Duration,
    revive_interval: Duration,
    /// Delivery attempts allowed per event; `None` means "live count at
    /// attempt start".
    max_retries: Option<usize>,
}

impl<C: WorkerClient> Dispatcher<C> {
    /// Assemble a dispatcher from its components.
    pub fn new(
        pool: Arc<WorkerPool>,
        scheduler: PriorityRoundRobinScheduler,
        client: C,
        log: Arc<EventLog>,
        delivery_timeout: Duration,
        revive_interval: Duration,
        max_retries: Option<usize>,
    ) -> Self {
        Self {
            pool,
            scheduler,
            client,
            log,
            delivery_timeout,
            revive_interval,
            max_retries,
        }
    }

    /// Dispatch one event and append its outcome to the event log.
    ///
    /// The returned outcome is the same record that was logged; every
    /// submitted event produces exactly one, whatever its fate.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::LogClosed` if the event log has shut down,
    /// the only component fault that can escape; every scheduling/delivery
    /// result is expressed in the outcome's status.
    pub async fn submit(&self, event: Event) -> Result<DispatchOutcome, DispatchError> {
        let max_attempts = self.max_retries.unwrap_or_else(|| self.pool.live_count());
        let mut excluded: Vec<WorkerId> = Vec::new();
        let mut attempts: u32 = 0;

        let (status, assigned) = loop {
            if attempts as usize >= max_attempts && attempts > 0 {
                warn!(
                    collection = %event.collection_id,
                    attempts,
                    "failover retries exhausted"
                );
                break (OutcomeStatus::FailedOver, None);
            }

            match self.scheduler.pick(now_ms(), &excluded) {
                Pick::NoCapacity => {
                    break if attempts == 0 {
                        debug!(collection = %event.collection_id, "no live workers");
                        (OutcomeStatus::RejectedNoCapacity, None)
                    } else {
                        // Every remaining worker is excluded or gone DOWN;
                        // all attempted workers failed.
                        (OutcomeStatus::FailedOver, None)
                    };
                }
                Pick::RateLimited => {
                    debug!(collection = %event.collection_id, "all live workers saturated");
                    break (OutcomeStatus::RateLimited, None);
                }
                Pick::Admitted(worker) => {
                    attempts += 1;
                    match self.deliver_once(&worker, &event).await {
                        Ok(()) => {
                            // The worker came from the pool; the id is known.
                            if let Err(err) = self.pool.mark_success(&worker.id) {
                                tracing::error!(worker = %worker.id, error = %err, "mark_success failed");
                            }
                            info!(
                                worker = %worker.id,
                                collection = %event.collection_id,
                                event_type = %event.event_type,
                                attempts,
                                "event delivered"
                            );
                            break (OutcomeStatus::Admitted, Some(worker.id));
                        }
                        Err(err) => {
                            warn!(
                                worker = %worker.id,
                                collection = %event.collection_id,
                                error = %err,
                                "delivery failed, failing over"
                            );
                            if let Err(err) = self.pool.mark_failure(&worker.id, now_ms()) {
                                tracing::error!(worker = %worker.id, error = %err, "mark_failure failed");
                            }
                            excluded.push(worker.id);
                        }
                    }
                }
            }
        };

        let outcome = DispatchOutcome::record(event, assigned, status, attempts, now_ms());
        self.log.append(outcome.clone())?;
        Ok(outcome)
    }

    /// Dispatch a batch: urgent events first (ascending priority value,
    /// stable by arrival order), then one sequential `submit` per event.
    ///
    /// # Errors
    ///
    /// Fails only if the event log has shut down mid-batch.
    pub async fn submit_batch(
        &self,
        mut events: Vec<Event>,
    ) -> Result<Vec<DispatchOutcome>, DispatchError> {
        order_batch(&mut events);
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            outcomes.push(self.submit(event).await?);
        }
        Ok(outcomes)
    }

    /// One timed delivery attempt. A timeout abandons the in-flight future
    /// and counts as a failure; nothing from an abandoned attempt is applied
    /// afterwards.
    async fn deliver_once(&self, worker: &Worker, event: &Event) -> Result<(), DeliveryError> {
        match tokio::time::timeout(self.delivery_timeout, self.client.deliver(worker, event)).await
        {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout),
        }
    }

    /// Spawn the periodic revival loop: every revive interval, promote DOWN
    /// workers whose fail timeout elapsed to half-open SUSPECT. Returns a
    /// handle that stops the loop.
    pub fn spawn_revive_loop(&self, spawner: &impl Spawn) -> ReviverHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let pool = Arc::clone(&self.pool);
        let interval = self.revive_interval;
        spawner.spawn(async move {
            debug!("revival loop started");
            loop {
                tokio::time::sleep(interval).await;
                if flag.load(Ordering::Acquire) {
                    debug!("revival loop stopping");
                    break;
                }
                let revived = pool.revive_if_due(now_ms());
                if revived > 0 {
                    info!(revived, "revived workers to half-open");
                }
            }
        });
        ReviverHandle { stop }
    }

    /// The worker pool, for health queries.
    #[must_use]
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// The event log, for reporting collaborators.
    #[must_use]
    pub fn log(&self) -> &Arc<EventLog> {
        &self.log
    }
}
