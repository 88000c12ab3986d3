//! Append-only dispatch outcome log.
//!
//! Producers append over an unbounded channel; a single dedicated writer
//! thread drains it in FIFO order into the shared record vector and the
//! optional persistence sink. Channel order is the linearization order: a
//! reader's [`EventLog::snapshot`] always sees a consistent prefix of
//! completed appends, never an interleaved or reordered record.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Sender};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::core::error::DispatchError;
use crate::core::event::DispatchOutcome;
use crate::infra::sink::OutcomeSink;

enum LogMsg {
    Record(DispatchOutcome),
    Flush(Sender<()>),
}

/// Append-only, concurrently-writable sink of dispatch outcomes.
///
/// Appends never block the scheduling path: they enqueue onto the writer
/// channel and return. `flush` rendezvouses with the writer when a caller
/// needs to observe a fully drained log (tests, shutdown).
pub struct EventLog {
    /// Sender to the writer thread. `None` after close; dropping it is what
    /// unblocks the writer's recv loop.
    tx: Mutex<Option<Sender<LogMsg>>>,
    records: Arc<RwLock<Vec<DispatchOutcome>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl EventLog {
    /// Create a log with no persistence sink.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a log that forwards every record to `sink` after recording it.
    #[must_use]
    pub fn with_sink(sink: Box<dyn OutcomeSink>) -> Self {
        Self::build(Some(sink))
    }

    fn build(mut sink: Option<Box<dyn OutcomeSink>>) -> Self {
        let (tx, rx) = unbounded::<LogMsg>();
        let records = Arc::new(RwLock::new(Vec::new()));
        let shared = Arc::clone(&records);

        let writer = thread::Builder::new()
            .name("dispatch-log-writer".into())
            .spawn(move || {
                debug!("log writer started");
                // Blocking recv; when every sender is dropped the loop ends.
                while let Ok(msg) = rx.recv() {
                    match msg {
                        LogMsg::Record(outcome) => {
                            shared.write().push(outcome.clone());
                            if let Some(s) = sink.as_mut() {
                                s.record(outcome);
                            }
                        }
                        LogMsg::Flush(ack) => {
                            if let Some(s) = sink.as_mut() {
                                s.flush();
                            }
                            let _ = ack.send(());
                        }
                    }
                }
                if let Some(s) = sink.as_mut() {
                    s.flush();
                }
                debug!("log writer exiting");
            })
            .map_err(|e| warn!(error = %e, "failed to spawn log writer"))
            .ok();

        Self {
            tx: Mutex::new(writer.is_some().then_some(tx)),
            records,
            writer: Mutex::new(writer),
        }
    }

    /// Append one outcome record.
    ///
    /// Non-blocking: the record is handed to the writer channel and becomes
    /// visible to readers once the writer has sequenced it.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::LogClosed` after `close`, or if the writer
    /// thread is gone.
    pub fn append(&self, outcome: DispatchOutcome) -> Result<(), DispatchError> {
        let guard = self.tx.lock();
        let tx = guard.as_ref().ok_or(DispatchError::LogClosed)?;
        tx.send(LogMsg::Record(outcome))
            .map_err(|_| DispatchError::LogClosed)
    }

    /// Block until every append issued before this call has been sequenced,
    /// and the sink (if any) has been flushed.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::LogClosed` if the writer is gone.
    pub fn flush(&self) -> Result<(), DispatchError> {
        let ack_rx = {
            let guard = self.tx.lock();
            let tx = guard.as_ref().ok_or(DispatchError::LogClosed)?;
            let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
            tx.send(LogMsg::Flush(ack_tx))
                .map_err(|_| DispatchError::LogClosed)?;
            ack_rx
        };
        ack_rx.recv().map_err(|_| DispatchError::LogClosed)
    }

    /// A consistent prefix of the log: every record the writer has sequenced
    /// so far, in append order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DispatchOutcome> {
        self.records.read().clone()
    }

    /// Number of sequenced records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no record has been sequenced yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Shut down the writer: drain outstanding appends, flush the sink, and
    /// join the writer thread with a bounded wait.
    pub fn close(&self) {
        let _ = self.flush();
        {
            let mut tx = self.tx.lock();
            *tx = None;
        }
        if let Some(handle) = self.writer.lock().take() {
            // Bounded join so a wedged sink cannot hang shutdown.
            let (done_tx, done_rx) = crossbeam_channel::bounded(1);
            let join_thread = thread::spawn(move || {
                let ok = handle.join().is_ok();
                let _ = done_tx.send(ok);
            });
            match done_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(true) => debug!("log writer joined"),
                Ok(false) => warn!("log writer panicked"),
                Err(_) => warn!("log writer did not exit within timeout, detaching"),
            }
            let _ = join_thread.join();
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        // Signal shutdown but do not join: let outstanding records drain on
        // the detached writer. Explicit close() is the graceful path.
        let mut tx = self.tx.lock();
        if tx.take().is_some() {
            debug!("event log dropped without explicit close, writer detached");
        }
    }
}
