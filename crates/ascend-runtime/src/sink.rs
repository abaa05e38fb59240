//! Destinations for game-facing log entries.

use tracing::{info, warn};

use ascend_core::{LogEntry, Severity};

pub trait LogSink {
    fn record(&mut self, entry: &LogEntry);
}

/// Keeps every entry in memory. Used by tests and the CLI summary.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub entries: Vec<LogEntry>,
}

impl MemorySink {
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }
}

impl LogSink for MemorySink {
    fn record(&mut self, entry: &LogEntry) {
        self.entries.push(entry.clone());
    }
}

/// Forwards entries to `tracing`; danger entries become warnings.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&mut self, entry: &LogEntry) {
        match entry.severity {
            Severity::Danger => warn!(target: "game", "{}", entry.message),
            severity => info!(target: "game", ?severity, "{}", entry.message),
        }
    }
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn record(&mut self, entry: &LogEntry) {
        (**self).record(entry);
    }
}
