//! Builders to construct a dispatcher from configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::config::DispatchConfig;
use crate::core::dispatcher::{Dispatcher, WorkerClient};
use crate::core::error::DispatchError;
use crate::core::event_log::EventLog;
use crate::core::rate_limiter::RateLimiter;
use crate::core::scheduler::PriorityRoundRobinScheduler;
use crate::core::worker_pool::{Worker, WorkerPool};
use crate::infra::sink::OutcomeSink;
use crate::util::serde::WorkerId;

/// Build a dispatcher from validated configuration.
///
/// The pool, limiter, and scheduler are assembled over the configured
/// topology; `sink` optionally attaches outcome persistence to the event log.
///
/// # Errors
///
/// Returns `DispatchError::InvalidConfig` if `cfg` fails validation.
pub fn build_dispatcher<C: WorkerClient>(
    cfg: &DispatchConfig,
    client: C,
    sink: Option<Box<dyn OutcomeSink>>,
) -> Result<Dispatcher<C>, DispatchError> {
    cfg.validate().map_err(DispatchError::InvalidConfig)?;

    let workers: Vec<Worker> = cfg
        .workers
        .iter()
        .map(|w| Worker::new(w.id.as_str(), w.address.as_str()))
        .collect();
    let ids: Vec<WorkerId> = workers.iter().map(|w| w.id.clone()).collect();

    let pool = Arc::new(WorkerPool::new(
        workers,
        cfg.max_fails,
        u128::from(cfg.fail_timeout_secs) * 1000,
    )?);
    let limiter = Arc::new(RateLimiter::new(
        ids,
        cfg.rate_limit,
        u128::from(cfg.window_secs) * 1000,
    ));
    let scheduler = PriorityRoundRobinScheduler::new(Arc::clone(&pool), limiter);
    let log = Arc::new(sink.map_or_else(EventLog::new, EventLog::with_sink));

    Ok(Dispatcher::new(
        pool,
        scheduler,
        client,
        log,
        Duration::from_secs(cfg.delivery_timeout_secs),
        Duration::from_secs(cfg.revive_interval_secs),
        cfg.max_retries,
    ))
}
