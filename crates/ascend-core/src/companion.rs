//! Spirit-beast companions.

use serde::{Deserialize, Serialize};

use crate::realm::Rarity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompanionId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionStats {
    pub attack: u64,
    pub defense: u64,
    pub hp: u64,
    pub speed: u64,
}

/// Experience a fresh companion needs for its first level.
pub const COMPANION_START_MAX_EXP: u64 = 60;
pub const COMPANION_START_AFFECTION: u32 = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Companion {
    pub id: CompanionId,
    pub template: String,
    pub name: String,
    pub species: String,
    pub rarity: Rarity,
    pub level: u32,
    pub exp: u64,
    pub max_exp: u64,
    pub stats: CompanionStats,
    pub skills: Vec<String>,
    pub evolution_stage: u8,
    pub affection: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionTemplate {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub base_stats: CompanionStats,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Companion {
    /// A level-1 companion with stats copied from the template.
    pub fn from_template(id: CompanionId, key: &str, template: &CompanionTemplate) -> Self {
        Self {
            id,
            template: key.to_string(),
            name: template.name.clone(),
            species: template.species.clone(),
            rarity: template.rarity,
            level: 1,
            exp: 0,
            max_exp: COMPANION_START_MAX_EXP,
            stats: template.base_stats,
            skills: template.skills.clone(),
            evolution_stage: 0,
            affection: COMPANION_START_AFFECTION,
        }
    }
}
