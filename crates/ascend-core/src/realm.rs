//! Ordered advancement tiers and rarity tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of sub-levels inside every realm.
pub const MAX_REALM_LEVEL: u8 = 9;

/// Major cultivation tier. Declaration order is advancement order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Realm {
    QiRefining,
    Foundation,
    GoldenCore,
    NascentSoul,
    SpiritSevering,
    DaoCombining,
    Longevity,
}

impl Realm {
    pub const ALL: [Realm; 7] = [
        Realm::QiRefining,
        Realm::Foundation,
        Realm::GoldenCore,
        Realm::NascentSoul,
        Realm::SpiritSevering,
        Realm::DaoCombining,
        Realm::Longevity,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The realm reached by crossing this realm's final sub-level.
    pub fn next(self) -> Option<Realm> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn is_final(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Realm::QiRefining => "Qi Refining",
            Realm::Foundation => "Foundation Establishment",
            Realm::GoldenCore => "Golden Core",
            Realm::NascentSoul => "Nascent Soul",
            Realm::SpiritSevering => "Spirit Severing",
            Realm::DaoCombining => "Dao Combining",
            Realm::Longevity => "Longevity",
        };
        f.write_str(s)
    }
}

/// Item, companion and reward rarity. `Common` is the lowest tier.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Legendary,
    Immortal,
}

impl Rarity {
    pub const LOWEST: Rarity = Rarity::Common;

    pub fn is_above_lowest(self) -> bool {
        self > Self::LOWEST
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
            Rarity::Immortal => "immortal",
        };
        f.write_str(s)
    }
}
