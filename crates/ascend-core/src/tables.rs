//! Static, read-only game tables.
//!
//! Tables are loaded once per session (see the `catalog` crate) and shared
//! immutably by every reducer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::companion::CompanionTemplate;
use crate::item::ItemTemplate;
use crate::payoff::{RewardTable, UnlockKind};
use crate::realm::{Realm, MAX_REALM_LEVEL};
use crate::stats::StatBlock;

/// Per-realm advancement curve and rewards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealmDefinition {
    pub realm: Realm,
    /// Experience needed at sub-level 1.
    pub base_experience: u64,
    /// Additional experience per sub-level above 1.
    pub experience_step: u64,
    /// Base-stat gain for every breakthrough that lands in this realm.
    #[serde(default)]
    pub gains: StatBlock,
    #[serde(default)]
    pub attribute_points: u32,
    /// Unlock that must be held to enter this realm.
    #[serde(default)]
    pub requires: Option<UnlockKind>,
}

impl RealmDefinition {
    pub fn threshold(&self, level: u8) -> u64 {
        let level = level.clamp(1, MAX_REALM_LEVEL);
        self.base_experience + self.experience_step * u64::from(level - 1)
    }
}

/// Parameters of the tribulation guarding entry into a realm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TribulationConfig {
    pub name: String,
    /// Success chance before stat bonuses, in `[0, 1]`.
    pub base_success: f64,
    /// Defense + spirit + physique per +1.0 of success chance.
    pub stat_scale: f64,
    /// Cap on the stat-derived bonus.
    pub max_bonus: f64,
    /// Hp loss on success, as a fraction of max hp.
    pub hp_loss_min: f64,
    pub hp_loss_max: f64,
}

/// Flat stat modifier: talents, titles and cultivation arts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    #[serde(default)]
    pub effects: StatBlock,
    /// Currency cost to learn (arts only).
    #[serde(default)]
    pub cost: u64,
    #[serde(default)]
    pub min_realm: Option<Realm>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub cost: u64,
    /// Item template key of the product.
    pub output: String,
}

/// All static tables of one session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tables {
    pub realms: Vec<RealmDefinition>,
    pub tribulations: BTreeMap<Realm, TribulationConfig>,
    pub items: BTreeMap<String, ItemTemplate>,
    pub companions: BTreeMap<String, CompanionTemplate>,
    pub rewards: BTreeMap<String, RewardTable>,
    /// Variants an unlock can resolve to, e.g. the foundation treasures.
    pub unlocks: BTreeMap<UnlockKind, Vec<String>>,
    /// Names of the longevity rules a draw can grant.
    pub longevity_rules: Vec<String>,
    pub talents: BTreeMap<String, Modifier>,
    pub titles: BTreeMap<String, Modifier>,
    pub arts: BTreeMap<String, Modifier>,
    pub recipes: BTreeMap<String, Recipe>,
}

impl Tables {
    pub fn realm(&self, realm: Realm) -> Option<&RealmDefinition> {
        self.realms.iter().find(|d| d.realm == realm)
    }

    /// Experience threshold for `(realm, level)`; unknown realms fall back to
    /// a flat curve so progression never divides by a missing row.
    pub fn threshold(&self, realm: Realm, level: u8) -> u64 {
        match self.realm(realm) {
            Some(def) => def.threshold(level),
            None => FALLBACK_THRESHOLD,
        }
    }

    pub fn tribulation(&self, target: Realm) -> Option<&TribulationConfig> {
        self.tribulations.get(&target)
    }

    pub fn item(&self, key: &str) -> Option<&ItemTemplate> {
        self.items.get(key)
    }

    /// Template key whose display name is `name`.
    pub fn item_key_by_name(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(_, t)| t.name == name)
            .map(|(k, _)| k.as_str())
    }

    pub fn companion(&self, key: &str) -> Option<&CompanionTemplate> {
        self.companions.get(key)
    }

    pub fn reward_table(&self, key: &str) -> Option<&RewardTable> {
        self.rewards.get(key)
    }
}

const FALLBACK_THRESHOLD: u64 = 100;
