//! In-memory outcome sink for testing and dev.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::event::DispatchOutcome;

use super::OutcomeSink;

/// In-memory sink with a bounded ring buffer.
///
/// Cloning (via [`InMemorySink::handle`]) shares the underlying buffer, so a
/// test can keep a handle while the event log owns the sink itself.
pub struct InMemorySink {
    events: Arc<Mutex<VecDeque<DispatchOutcome>>>,
    max_events: usize,
}

impl InMemorySink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events))),
            max_events,
        }
    }

    /// A handle sharing this sink's buffer.
    #[must_use]
    pub fn handle(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
            max_events: self.max_events,
        }
    }

    /// Retrieve a snapshot of stored records.
    #[must_use]
    pub fn events(&self) -> Vec<DispatchOutcome> {
        self.events.lock().iter().cloned().collect()
    }
}

impl OutcomeSink for InMemorySink {
    fn record(&mut self, outcome: DispatchOutcome) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::{Event, EventType, OutcomeStatus};
    use crate::util::serde::{Priority, ResourceRequest};

    fn outcome(n: u32) -> DispatchOutcome {
        let event = Event::new(
            EventType::Finish,
            format!("col-{n}"),
            ResourceRequest::ZERO,
            Priority::highest(),
        );
        DispatchOutcome::record(event, None, OutcomeStatus::RateLimited, n, u128::from(n))
    }

    #[test]
    fn test_bounded_buffer_drops_oldest() {
        let mut sink = InMemorySink::new(3);
        for n in 0..5 {
            sink.record(outcome(n));
        }
        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].attempt_count, 2);
        assert_eq!(events[2].attempt_count, 4);
    }

    #[test]
    fn test_handle_shares_buffer() {
        let mut sink = InMemorySink::new(8);
        let handle = sink.handle();
        sink.record(outcome(1));
        assert_eq!(handle.events().len(), 1);
    }
}
