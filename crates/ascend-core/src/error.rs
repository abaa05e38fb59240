//! Error taxonomy shared by every reducer.
//!
//! - [`ValidationError`]: the request is well-formed but not allowed now
//!   (insufficient resources, invalid target).
//! - [`StateError`]: the request is not valid in the current progression
//!   state.
//! - [`DataIntegrityWarning`]: a catalog reference is missing; callers fall
//!   back and keep going.
//!
//! None of these abort the update cycle: the runtime turns them into log
//! entries and leaves the character record untouched.

use thiserror::Error;

use crate::item::{EquipmentSlot, ItemId, SlotKind};
use crate::realm::Realm;

/// Rejected user actions and broken record invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("not enough spirit stones: need {need}, have {have}")]
    InsufficientCurrency { need: u64, have: u64 },
    #[error("not enough draw tickets: need {need}, have {have}")]
    InsufficientTickets { need: u64, have: u64 },
    #[error("no attribute points left to allocate")]
    NoAttributePoints,
    #[error("draw count must be at least 1")]
    ZeroDraws,
    #[error("item quantity must be at least 1")]
    ZeroQuantity,
    #[error("{0} is not in the inventory")]
    ItemNotFound(ItemId),
    #[error("{0} is equipped; unequip it first")]
    ItemEquipped(ItemId),
    #[error("{0} is the natal artifact; unbind it first")]
    NatalArtifactBound(ItemId),
    #[error("{id} has only {have}, cannot remove {need}")]
    InsufficientQuantity { id: ItemId, need: u32, have: u32 },
    #[error("{0} cannot be equipped")]
    NotEquippable(ItemId),
    #[error("{0} cannot be used")]
    NotConsumable(ItemId),
    #[error("{0} is not an artifact")]
    NotAnArtifact(ItemId),
    #[error("slot {slot:?} does not accept {kind:?} items")]
    SlotMismatch { slot: EquipmentSlot, kind: SlotKind },
    #[error("nothing is equipped in {0:?}")]
    SlotEmpty(EquipmentSlot),
    #[error("reward table '{0}' has no entries")]
    EmptyRewardTable(String),
    #[error("unknown {table} entry '{key}'")]
    UnknownEntry { table: &'static str, key: String },
    #[error("cultivation art '{0}' is already learned")]
    ArtAlreadyLearned(String),
    #[error("requires the {0} realm")]
    RealmTooLow(Realm),
    #[error("recipe '{0}' has not been learned")]
    RecipeUnknown(String),
    #[error("missing ingredient {name}: need {need}, have {have}")]
    MissingIngredient { name: String, need: u32, have: u32 },
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("realm level {0} is outside 1..=9")]
    RealmLevelOutOfRange(u8),
    #[error("hp {hp} exceeds max hp {max_hp}")]
    HpAboveMax { hp: u64, max_hp: u64 },
    #[error("equipped {0} does not exist in the inventory")]
    DanglingEquip(ItemId),
    #[error("duplicate item id {0}")]
    DuplicateItemId(ItemId),
    #[error("holds {held} longevity rules, cap is {cap}")]
    TooManyLongevityRules { held: usize, cap: u32 },
    #[error("id {id} is not below the next id {next_id}")]
    IdNotAllocated { id: u64, next_id: u64 },
    #[error("character name must not be empty")]
    EmptyName,
}

/// Actions attempted in a progression state that forbids them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("a tribulation is already underway")]
    TribulationAlreadyOpen,
    #[error("no tribulation is waiting for confirmation")]
    NoPendingConfirmation,
    #[error("no tribulation is active")]
    NoActiveTribulation,
    #[error("the character has fallen")]
    CharacterDead,
    #[error("the character is alive")]
    CharacterAlive,
    #[error("action is cooling down for {0} more ticks")]
    CoolingDown(u32),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// A reference into the static tables that could not be resolved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("missing {table} entry '{key}'; {fallback}")]
pub struct DataIntegrityWarning {
    pub table: &'static str,
    pub key: String,
    pub fallback: &'static str,
}

impl DataIntegrityWarning {
    pub fn new(table: &'static str, key: impl Into<String>, fallback: &'static str) -> Self {
        Self {
            table,
            key: key.into(),
            fallback,
        }
    }
}
