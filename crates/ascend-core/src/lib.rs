#![deny(warnings)]

//! Core domain models and invariants for the cultivation game.
//!
//! This crate defines the serializable character record, the static table
//! types every reducer reads, the shared error taxonomy and the two leaf
//! components the rest of the workspace builds on: the attribute aggregator
//! and the inventory mutator.

pub mod attributes;
pub mod character;
pub mod companion;
pub mod config;
pub mod error;
pub mod inventory;
pub mod item;
pub mod log;
pub mod payoff;
pub mod realm;
pub mod rng;
pub mod stats;
pub mod tables;

pub use attributes::{attribute_sources, effective_stats, recompute, AttributeSources};
pub use character::{validate_character, Character, Statistics, Wallet};
pub use companion::{Companion, CompanionId, CompanionStats, CompanionTemplate};
pub use config::GameConfig;
pub use error::{CoreError, DataIntegrityWarning, StateError, ValidationError};
pub use inventory::Inventory;
pub use item::{EquipmentSlot, Item, ItemCategory, ItemId, ItemTemplate, SlotKind, TransientEffect};
pub use log::{LogEntry, Severity};
pub use payoff::{Payoff, RewardEntry, RewardTable, UnlockKind};
pub use realm::{Rarity, Realm, MAX_REALM_LEVEL};
pub use rng::{seeded, RandomSource, ScriptedSource};
pub use stats::{Attribute, StatBlock};
pub use tables::{Ingredient, Modifier, RealmDefinition, Recipe, Tables, TribulationConfig};
