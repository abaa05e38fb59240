//! Passive regeneration on the periodic tick.

use ascend_core::{Character, GameConfig};

/// Regenerate a wounded, living character. Returns the hp restored.
pub fn regenerate(c: &mut Character, config: &GameConfig) -> u64 {
    let max = c.max_hp();
    if c.hp == 0 || c.hp >= max {
        return 0;
    }
    let before = c.hp;
    c.heal(config.regen_amount(max));
    c.hp - before
}
