//! Telemetry helpers for structured logging.

/// Initialize tracing for the dispatcher. Callers can install their own
/// subscriber instead; this helper installs an env-filtered fmt subscriber
/// only if none is set yet.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
