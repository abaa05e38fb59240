//! Items, item templates and equipment slots.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::realm::Rarity;
use crate::stats::StatBlock;

/// Per-instance item identity, unique within one character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Equipment,
    Pill,
    Herb,
    Material,
    Recipe,
    Egg,
}

impl ItemCategory {
    /// Everything except equipment merges by name.
    pub fn is_stackable(self) -> bool {
        !matches!(self, ItemCategory::Equipment)
    }

    pub fn is_consumable(self) -> bool {
        matches!(
            self,
            ItemCategory::Pill | ItemCategory::Herb | ItemCategory::Recipe | ItemCategory::Egg
        )
    }
}

/// Family of slots an equipment item fits into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Weapon,
    Head,
    Shoulder,
    Chest,
    Gloves,
    Legs,
    Boots,
    Ring,
    Accessory,
    Artifact,
}

impl SlotKind {
    /// Concrete slots accepting this kind, in fill order.
    pub fn slots(self) -> &'static [EquipmentSlot] {
        use EquipmentSlot as E;
        match self {
            SlotKind::Weapon => &[E::Weapon],
            SlotKind::Head => &[E::Head],
            SlotKind::Shoulder => &[E::Shoulder],
            SlotKind::Chest => &[E::Chest],
            SlotKind::Gloves => &[E::Gloves],
            SlotKind::Legs => &[E::Legs],
            SlotKind::Boots => &[E::Boots],
            SlotKind::Ring => &[E::Ring1, E::Ring2, E::Ring3, E::Ring4],
            SlotKind::Accessory => &[E::Accessory1, E::Accessory2],
            SlotKind::Artifact => &[E::Artifact1, E::Artifact2],
        }
    }
}

/// Concrete equipment slot on a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Weapon,
    Head,
    Shoulder,
    Chest,
    Gloves,
    Legs,
    Boots,
    Ring1,
    Ring2,
    Ring3,
    Ring4,
    Accessory1,
    Accessory2,
    Artifact1,
    Artifact2,
}

impl EquipmentSlot {
    pub fn kind(self) -> SlotKind {
        use EquipmentSlot as E;
        match self {
            E::Weapon => SlotKind::Weapon,
            E::Head => SlotKind::Head,
            E::Shoulder => SlotKind::Shoulder,
            E::Chest => SlotKind::Chest,
            E::Gloves => SlotKind::Gloves,
            E::Legs => SlotKind::Legs,
            E::Boots => SlotKind::Boots,
            E::Ring1 | E::Ring2 | E::Ring3 | E::Ring4 => SlotKind::Ring,
            E::Accessory1 | E::Accessory2 => SlotKind::Accessory,
            E::Artifact1 | E::Artifact2 => SlotKind::Artifact,
        }
    }
}

/// Effect applied once when the item is consumed and then forgotten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransientEffect {
    /// Hp restored, capped at max hp.
    pub heal: u64,
    /// Experience granted.
    pub experience: u64,
}

impl TransientEffect {
    pub fn is_empty(&self) -> bool {
        self.heal == 0 && self.experience == 0
    }
}

/// One inventory entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: ItemCategory,
    pub rarity: Rarity,
    /// Always 1 for equipment.
    pub quantity: u32,
    #[serde(default)]
    pub effect: TransientEffect,
    /// Folded into base stats once on consumption.
    #[serde(default)]
    pub permanent: StatBlock,
    /// Stat contribution while equipped.
    #[serde(default)]
    pub bonus: StatBlock,
    #[serde(default)]
    pub slot: Option<SlotKind>,
    #[serde(default)]
    pub sell_price: u64,
    /// Recipe learned when a recipe item is read.
    #[serde(default)]
    pub teaches: Option<String>,
}

impl Item {
    pub fn is_equipment(&self) -> bool {
        self.category == ItemCategory::Equipment
    }
}

/// Catalog entry from which item instances are minted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub name: String,
    pub category: ItemCategory,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub effect: TransientEffect,
    #[serde(default)]
    pub permanent: StatBlock,
    #[serde(default)]
    pub bonus: StatBlock,
    #[serde(default)]
    pub slot: Option<SlotKind>,
    #[serde(default)]
    pub sell_price: u64,
    #[serde(default)]
    pub teaches: Option<String>,
}

impl ItemTemplate {
    pub fn instantiate(&self, id: ItemId, quantity: u32) -> Item {
        Item {
            id,
            name: self.name.clone(),
            category: self.category,
            rarity: self.rarity,
            quantity,
            effect: self.effect,
            permanent: self.permanent,
            bonus: self.bonus,
            slot: self.slot,
            sell_price: self.sell_price,
            teaches: self.teaches.clone(),
        }
    }
}
