//! Progression state carried between commands.

use ascend_core::{Character, Realm};

use crate::tribulation::TribulationState;

/// The part of the breakthrough machine that survives between commands.
///
/// `Locked` is the trigger-lock: entered on cancellation, it keeps a
/// threshold that is merely *equal* to the experience from re-prompting.
/// Nothing here is persisted; a reload starts at `Idle`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ProgressionPhase {
    #[default]
    Idle,
    Locked,
    AwaitingConfirmation {
        target: Realm,
    },
    TribulationActive(TribulationState),
}

impl ProgressionPhase {
    pub fn is_locked(&self) -> bool {
        matches!(self, ProgressionPhase::Locked)
    }

    pub fn is_tribulation_open(&self) -> bool {
        matches!(self, ProgressionPhase::TribulationActive(_))
    }

    /// Drop stale state after a command turned `before` into `after`.
    ///
    /// The lock clears once experience rises past the threshold or the
    /// realm or sub-level changes. A pending prompt or open tribulation is
    /// discarded when the realm or sub-level changes under it.
    pub fn refresh(self, before: &Character, after: &Character) -> Self {
        let moved = (before.realm, before.realm_level) != (after.realm, after.realm_level);
        match self {
            ProgressionPhase::Locked
                if moved || after.experience > after.experience_threshold =>
            {
                ProgressionPhase::Idle
            }
            ProgressionPhase::AwaitingConfirmation { .. }
            | ProgressionPhase::TribulationActive(_)
                if moved =>
            {
                ProgressionPhase::Idle
            }
            other => other,
        }
    }
}
