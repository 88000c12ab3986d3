//! File-backed outcome sink writing one JSON record per line.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::error;

use crate::core::event::DispatchOutcome;

use super::OutcomeSink;

/// Append-only JSONL file sink.
///
/// Records are buffered; the event log's writer flushes on `flush` and at
/// shutdown. Serialization or write failures are logged and skipped; the
/// in-memory log stays authoritative.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    /// Open (or create) the log file at `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl OutcomeSink for JsonlSink {
    fn record(&mut self, outcome: DispatchOutcome) {
        match serde_json::to_string(&outcome) {
            Ok(line) => {
                if let Err(e) = writeln!(self.writer, "{line}") {
                    error!(error = %e, "failed to write outcome record");
                }
            }
            Err(e) => error!(error = %e, "failed to serialize outcome record"),
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            error!(error = %e, "failed to flush outcome log file");
        }
    }
}
