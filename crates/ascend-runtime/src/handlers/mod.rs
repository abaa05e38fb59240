//! Reducers behind the non-progression commands.
//!
//! Every handler mutates a working copy of the record; the session commits
//! the copy only when the handler returns `Ok`.

pub mod battle;
pub mod character;
pub mod items;
pub mod regen;
pub mod shop;

use ascend_core::{Character, DataIntegrityWarning, GameConfig, LogEntry, Tables};
use ascend_rewards::{Resolution, RewardSummary};

pub struct Ctx<'a, R: ?Sized> {
    pub tables: &'a Tables,
    pub config: &'a GameConfig,
    pub rng: &'a mut R,
}

/// What a successful handler reports besides the new record.
#[derive(Debug, Default)]
pub struct Effects {
    pub logs: Vec<LogEntry>,
    pub summary: Option<RewardSummary>,
}

impl Effects {
    pub fn log(entry: LogEntry) -> Self {
        Self {
            logs: vec![entry],
            summary: None,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.logs.push(entry);
    }

    pub fn warnings(&mut self, warnings: &[DataIntegrityWarning]) {
        self.logs.extend(warnings.iter().map(LogEntry::from));
    }

    /// Take over a resolver result: commit its record into `character` and
    /// keep its logs and summary.
    pub fn absorb(&mut self, character: &mut Character, resolution: Resolution) {
        *character = resolution.character;
        self.logs.extend(resolution.logs);
        if let Some(entry) = resolution.summary.to_log() {
            self.logs.push(entry);
        }
        self.summary = Some(resolution.summary);
    }
}
