//! Activity logging: append-only JSONL with graceful degradation.

pub mod jsonl;

use crate::logger::jsonl::{JsonlWriter, LogEntry};

/// Sink for controller activity events.
pub trait ActivityLog {
    /// Record one event. Logging never fails the caller.
    fn record(&mut self, entry: &LogEntry);
}

impl ActivityLog for JsonlWriter {
    fn record(&mut self, entry: &LogEntry) {
        self.write_entry(entry);
    }
}
