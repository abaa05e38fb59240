//! Reward payoffs and weighted reward tables.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::realm::Rarity;

/// One-per-lifetime progression unlocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockKind {
    FoundationTreasure,
    HeavenEarthEssence,
    HeavenEarthMarrow,
}

impl fmt::Display for UnlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnlockKind::FoundationTreasure => "foundation treasure",
            UnlockKind::HeavenEarthEssence => "heaven-earth essence",
            UnlockKind::HeavenEarthMarrow => "heaven-earth marrow",
        };
        f.write_str(s)
    }
}

/// What a reward entry grants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payoff {
    Currency {
        amount: u64,
    },
    Experience {
        amount: u64,
    },
    Item {
        template: String,
        #[serde(default = "one")]
        quantity: u32,
    },
    Companion {
        template: String,
    },
    Ticket {
        amount: u64,
    },
    /// Granted once per lifetime; later draws pay `fallback_currency`.
    SingletonUnlock {
        unlock: UnlockKind,
        fallback_currency: u64,
    },
    /// A longevity rule the character does not hold yet, while under its
    /// rule cap; otherwise `fallback_currency`.
    LongevityRule {
        fallback_currency: u64,
    },
}

fn one() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    pub weight: u32,
    #[serde(default)]
    pub rarity: Rarity,
    pub payoff: Payoff,
}

/// Ordered weighted entries. Order matters for sampling and the zero-weight
/// fallback.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTable {
    pub entries: Vec<RewardEntry>,
}

impl RewardTable {
    pub fn new(entries: Vec<RewardEntry>) -> Self {
        Self { entries }
    }

    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
