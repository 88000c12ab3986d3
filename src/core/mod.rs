//! Core dispatch and admission-control components.

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod event_log;
pub mod rate_limiter;
pub mod scheduler;
pub mod worker_pool;

pub use dispatcher::{Dispatcher, ReviverHandle, Spawn, WorkerClient};
pub use error::{AppResult, DeliveryError, DispatchError};
pub use event::{DispatchOutcome, Event, EventType, OutcomeStatus};
pub use event_log::EventLog;
pub use rate_limiter::RateLimiter;
pub use scheduler::{order_batch, Pick, PriorityRoundRobinScheduler};
pub use worker_pool::{HealthState, Worker, WorkerHealth, WorkerPool};
