use serde::{Deserialize, Serialize};

/// Session configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for deterministic RNG.
    pub rng_seed: u64,
    /// Passive regeneration per tick is `max_hp / regen_divisor`, at least 1.
    pub regen_divisor: u64,
    /// Ticks an action stays on cooldown after use (items, crafting).
    pub action_cooldown: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            regen_divisor: 100,
            action_cooldown: 0,
        }
    }
}

impl GameConfig {
    pub fn regen_amount(&self, max_hp: u64) -> u64 {
        (max_hp / self.regen_divisor.max(1)).max(1)
    }
}
