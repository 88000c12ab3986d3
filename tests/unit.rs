//! Unit test suite covering configuration, builders, errors, and sinks.

#[path = "unit/builders_test.rs"]
mod builders_test;
#[path = "unit/config_test.rs"]
mod config_test;
#[path = "unit/error_test.rs"]
mod error_test;
#[path = "unit/sink_test.rs"]
mod sink_test;
