//! Tokio runtime spawner implementation.

use std::future::Future;
use std::sync::Arc;

use crate::core::dispatcher::Spawn;

/// Tokio-based spawner that runs background tasks on a tokio runtime.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: Arc<tokio::runtime::Handle>,
}

impl TokioSpawner {
    /// Create a spawner from a tokio runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Create a spawner bound to the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime context, like
    /// `tokio::runtime::Handle::current`.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut);
    }
}
