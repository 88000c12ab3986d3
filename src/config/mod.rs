//! Configuration models for the dispatcher and its worker topology.

pub mod dispatch;

pub use dispatch::{DispatchConfig, WorkerConfig};
