//! Ephemeral tribulation state and the reference outcome roll.

use tracing::debug;

use ascend_core::{Character, RandomSource, Realm, TribulationConfig};

/// Parameters of an open tribulation. Exists only inside
/// [`crate::ProgressionPhase::TribulationActive`] and is never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct TribulationState {
    pub target: Realm,
    pub name: String,
    /// Probability of success in `[0, 1]`.
    pub success_chance: f64,
    /// Hp lost on success, as a fraction of max hp.
    pub hp_loss_min: f64,
    pub hp_loss_max: f64,
}

/// Outcome of a tribulation, usually supplied by the front-end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TribulationResult {
    pub success: bool,
    /// Hp lost on success. Ignored on failure, which is always lethal.
    pub hp_loss: u64,
    pub description: String,
}

impl TribulationResult {
    pub fn success(hp_loss: u64) -> Self {
        Self {
            success: true,
            hp_loss,
            description: "The heavenly lightning disperses.".into(),
        }
    }

    pub fn failure() -> Self {
        Self {
            success: false,
            hp_loss: 0,
            description: "The heavenly lightning reduces you to ash.".into(),
        }
    }
}

/// Used when the target realm's tribulation row went missing after the
/// confirmation prompt was issued.
pub fn fallback_config(target: Realm) -> TribulationConfig {
    TribulationConfig {
        name: format!("{target} Tribulation"),
        base_success: 0.5,
        stat_scale: 1_000.0,
        max_bonus: 0.3,
        hp_loss_min: 0.1,
        hp_loss_max: 0.3,
    }
}

impl TribulationState {
    /// Success chance is the configured base plus a bonus from defense,
    /// spirit and physique, capped at `max_bonus`.
    pub fn open(character: &Character, target: Realm, config: &TribulationConfig) -> Self {
        let s = &character.stats;
        let pool = (s.defense + s.spirit + s.physique).max(0) as f64;
        let bonus = if config.stat_scale > 0.0 {
            (pool / config.stat_scale).min(config.max_bonus.max(0.0))
        } else {
            0.0
        };
        let lo = config.hp_loss_min.clamp(0.0, 1.0);
        let hi = config.hp_loss_max.clamp(lo, 1.0);
        let state = Self {
            target,
            name: config.name.clone(),
            success_chance: (config.base_success + bonus).clamp(0.0, 1.0),
            hp_loss_min: lo,
            hp_loss_max: hi,
        };
        debug!(?target, chance = state.success_chance, "tribulation opened");
        state
    }

    /// Reference resolver for drivers that do not simulate the ordeal.
    pub fn roll<R: RandomSource + ?Sized>(&self, rng: &mut R, character: &Character) -> TribulationResult {
        if rng.next_unit() >= self.success_chance {
            return TribulationResult {
                success: false,
                hp_loss: 0,
                description: format!("You fall to the {}.", self.name),
            };
        }
        let ratio = self.hp_loss_min + rng.next_unit() * (self.hp_loss_max - self.hp_loss_min);
        let hp_loss = (character.max_hp() as f64 * ratio).floor() as u64;
        TribulationResult {
            success: true,
            hp_loss,
            description: format!("You weather the {}.", self.name),
        }
    }
}
