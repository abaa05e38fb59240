//! Game-facing log entries.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, DataIntegrityWarning};

/// Display tone of a log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Gain,
    Danger,
    Special,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub severity: Severity,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn normal(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Normal)
    }

    pub fn gain(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Gain)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Danger)
    }

    pub fn special(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Special)
    }
}

impl From<&CoreError> for LogEntry {
    fn from(err: &CoreError) -> Self {
        LogEntry::danger(err.to_string())
    }
}

impl From<&DataIntegrityWarning> for LogEntry {
    fn from(w: &DataIntegrityWarning) -> Self {
        LogEntry::normal(w.to_string())
    }
}
