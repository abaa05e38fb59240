//! The persistent character record and its invariants.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::companion::{Companion, CompanionId};
use crate::error::ValidationError;
use crate::inventory::Inventory;
use crate::item::{EquipmentSlot, ItemId};
use crate::payoff::UnlockKind;
use crate::realm::{Realm, MAX_REALM_LEVEL};
use crate::stats::StatBlock;
use crate::tables::Tables;

/// Starting base stats of a fresh cultivator.
pub const STARTING_STATS: StatBlock = StatBlock {
    attack: 10,
    defense: 5,
    max_hp: 100,
    spirit: 5,
    physique: 5,
    speed: 10,
};

/// Spendable pools. All unsigned: resources can never go negative.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Spirit stones.
    pub currency: u64,
    pub tickets: u64,
    pub attribute_points: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub kills: u64,
    pub breakthroughs: u64,
    pub items_used: u64,
    pub companions_obtained: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub realm: Realm,
    pub realm_level: u8,
    pub experience: u64,
    pub experience_threshold: u64,
    /// Stats before talent, title, arts and equipment. Permanent effects,
    /// allocated points and breakthrough gains land here.
    pub base_stats: StatBlock,
    /// Cached output of the attribute aggregator.
    pub stats: StatBlock,
    pub hp: u64,
    pub wallet: Wallet,
    /// Draws made over the character's lifetime; drives pity.
    pub lifetime_draws: u64,
    pub inventory: Inventory,
    pub equipped: BTreeMap<EquipmentSlot, ItemId>,
    pub natal_artifact: Option<ItemId>,
    pub companions: Vec<Companion>,
    /// Acquired singleton unlocks and the variant each resolved to.
    pub unlocks: BTreeMap<UnlockKind, String>,
    pub talent: Option<String>,
    pub title: Option<String>,
    pub arts: Vec<String>,
    pub recipes: BTreeSet<String>,
    /// Longevity rules in acquisition order.
    #[serde(default)]
    pub longevity_rules: Vec<String>,
    #[serde(default = "default_rule_cap")]
    pub max_longevity_rules: u32,
    pub statistics: Statistics,
    next_id: u64,
}

/// How many longevity rules a fresh character may hold.
pub const DEFAULT_LONGEVITY_RULE_CAP: u32 = 3;

fn default_rule_cap() -> u32 {
    DEFAULT_LONGEVITY_RULE_CAP
}

impl Character {
    /// A level-1 Qi Refining cultivator with full hp.
    pub fn new(name: impl Into<String>, tables: &Tables) -> Self {
        let max_hp = STARTING_STATS.max_hp.max(1) as u64;
        Self {
            name: name.into(),
            realm: Realm::QiRefining,
            realm_level: 1,
            experience: 0,
            experience_threshold: tables.threshold(Realm::QiRefining, 1),
            base_stats: STARTING_STATS,
            stats: STARTING_STATS,
            hp: max_hp,
            wallet: Wallet::default(),
            lifetime_draws: 0,
            inventory: Inventory::default(),
            equipped: BTreeMap::new(),
            natal_artifact: None,
            companions: Vec::new(),
            unlocks: BTreeMap::new(),
            talent: None,
            title: None,
            arts: Vec::new(),
            recipes: BTreeSet::new(),
            longevity_rules: Vec::new(),
            max_longevity_rules: DEFAULT_LONGEVITY_RULE_CAP,
            statistics: Statistics::default(),
            next_id: 1,
        }
    }

    pub fn max_hp(&self) -> u64 {
        self.stats.max_hp.max(1) as u64
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    pub fn at_threshold(&self) -> bool {
        self.experience >= self.experience_threshold
    }

    /// Final realm at its final sub-level.
    pub fn at_peak(&self) -> bool {
        self.realm.is_final() && self.realm_level >= MAX_REALM_LEVEL
    }

    pub fn has_unlock(&self, kind: UnlockKind) -> bool {
        self.unlocks.contains_key(&kind)
    }

    /// Room left under the longevity rule cap.
    pub fn can_take_longevity_rule(&self) -> bool {
        self.longevity_rules.len() < self.max_longevity_rules as usize
    }

    pub fn is_equipped(&self, id: ItemId) -> bool {
        self.equipped.values().any(|v| *v == id)
    }

    pub fn allocate_item_id(&mut self) -> ItemId {
        ItemId(self.bump_id())
    }

    pub fn allocate_companion_id(&mut self) -> CompanionId {
        CompanionId(self.bump_id())
    }

    fn bump_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Heal by `amount`, capped at max hp.
    pub fn heal(&mut self, amount: u64) {
        self.hp = self.hp.saturating_add(amount).min(self.max_hp());
    }

    pub fn credit_currency(&mut self, amount: u64) -> Result<(), ValidationError> {
        self.wallet.currency = self
            .wallet
            .currency
            .checked_add(amount)
            .ok_or(ValidationError::Overflow("currency"))?;
        Ok(())
    }

    pub fn debit_currency(&mut self, amount: u64) -> Result<(), ValidationError> {
        if self.wallet.currency < amount {
            return Err(ValidationError::InsufficientCurrency {
                need: amount,
                have: self.wallet.currency,
            });
        }
        self.wallet.currency -= amount;
        Ok(())
    }

    pub fn gain_experience(&mut self, amount: u64) -> Result<(), ValidationError> {
        self.experience = self
            .experience
            .checked_add(amount)
            .ok_or(ValidationError::Overflow("experience"))?;
        Ok(())
    }
}

/// Validate the record invariants. Used on load and by property tests.
pub fn validate_character(c: &Character) -> Result<(), ValidationError> {
    if c.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !(1..=MAX_REALM_LEVEL).contains(&c.realm_level) {
        return Err(ValidationError::RealmLevelOutOfRange(c.realm_level));
    }
    if c.hp > c.max_hp() {
        return Err(ValidationError::HpAboveMax {
            hp: c.hp,
            max_hp: c.max_hp(),
        });
    }
    let mut seen = BTreeSet::new();
    for item in c.inventory.iter() {
        if !seen.insert(item.id) {
            return Err(ValidationError::DuplicateItemId(item.id));
        }
    }
    for id in c.equipped.values().chain(c.natal_artifact.iter()) {
        if !seen.contains(id) {
            return Err(ValidationError::DanglingEquip(*id));
        }
    }
    if c.longevity_rules.len() > c.max_longevity_rules as usize {
        return Err(ValidationError::TooManyLongevityRules {
            held: c.longevity_rules.len(),
            cap: c.max_longevity_rules,
        });
    }
    let issued = seen
        .iter()
        .map(|id| id.0)
        .chain(c.companions.iter().map(|p| p.id.0));
    for id in issued {
        if id >= c.next_id {
            return Err(ValidationError::IdNotAllocated {
                id,
                next_id: c.next_id,
            });
        }
    }
    Ok(())
}
