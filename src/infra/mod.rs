//! Infrastructure adapters for outcome persistence backends.

pub mod sink;

pub use sink::{InMemorySink, JsonlSink, OutcomeSink};
