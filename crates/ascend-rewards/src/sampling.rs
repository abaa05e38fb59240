//! Weighted sampling with the ten-draw pity guarantee.

use ascend_core::{RandomSource, RewardTable};

/// Every batch that brings the lifetime draw count to a multiple of this
/// value ends with an above-common result.
pub const PITY_INTERVAL: u64 = 10;

/// Select among `candidates` (indices into `table`) with `u ∈ [0, 1)`.
///
/// `r = u × total`; the first candidate whose cumulative weight exceeds `r`
/// wins. A zero total deterministically selects the first candidate.
fn pick_among(table: &RewardTable, candidates: &[usize], u: f64) -> usize {
    let weight = |i: usize| u64::from(table.entries[i].weight);
    let total: u64 = candidates.iter().map(|&i| weight(i)).sum();
    if total == 0 {
        return candidates[0];
    }
    let r = u * total as f64;
    let mut cumulative = 0u64;
    for &i in candidates {
        cumulative += weight(i);
        if cumulative as f64 > r {
            return i;
        }
    }
    // Float rounding can leave r == total; land on the last live entry.
    candidates
        .iter()
        .rev()
        .copied()
        .find(|&i| weight(i) > 0)
        .unwrap_or(candidates[0])
}

/// Index of one weighted draw over the whole table. `table` must be
/// non-empty.
pub fn pick_index(table: &RewardTable, u: f64) -> usize {
    let all: Vec<usize> = (0..table.entries.len()).collect();
    pick_among(table, &all, u)
}

pub fn pity_applies(lifetime_before: u64, count: u32) -> bool {
    count > 0 && (lifetime_before + u64::from(count)) % PITY_INTERVAL == 0
}

/// Draw `count` entry indices. When [`pity_applies`], the last draw is taken
/// from entries above the lowest rarity, or from the full table if there are
/// none. `table` must be non-empty.
pub fn draw_batch<R: RandomSource + ?Sized>(
    table: &RewardTable,
    lifetime_before: u64,
    count: u32,
    rng: &mut R,
) -> Vec<usize> {
    let all: Vec<usize> = (0..table.entries.len()).collect();
    let mut picks: Vec<usize> = (0..count)
        .map(|_| pick_among(table, &all, rng.next_unit()))
        .collect();

    if pity_applies(lifetime_before, count) {
        let rare: Vec<usize> = all
            .iter()
            .copied()
            .filter(|&i| table.entries[i].rarity.is_above_lowest())
            .collect();
        let pool = if rare.is_empty() { &all } else { &rare };
        if let Some(last) = picks.last_mut() {
            *last = pick_among(table, pool, rng.next_unit());
        }
    }
    picks
}
