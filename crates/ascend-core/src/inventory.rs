//! Inventory mutator: stacking, uniqueness and equip protection.
//!
//! Every reward, purchase, crafting and consumption path funnels through
//! these functions so the rules below hold everywhere:
//! - non-equipment items with the same name share one entry;
//! - equipment always gets its own entry of quantity 1;
//! - an equipped (or natal) item can be neither discarded nor sold;
//! - equipping only moves ids in and out of the equipped map.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::character::Character;
use crate::error::ValidationError;
use crate::item::{EquipmentSlot, Item, ItemId, ItemTemplate, SlotKind};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name == name)
    }

    /// Total units held under `name` across entries.
    pub fn count_named(&self, name: &str) -> u32 {
        self.items
            .iter()
            .filter(|i| i.name == name)
            .map(|i| i.quantity)
            .sum()
    }

    /// Insert following the stacking rule; returns the id of the entry that
    /// now holds the units.
    pub fn add(&mut self, item: Item) -> ItemId {
        if item.category.is_stackable() {
            if let Some(existing) = self
                .items
                .iter_mut()
                .find(|i| i.name == item.name && i.category.is_stackable())
            {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                return existing.id;
            }
        }
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Decrement an entry, deleting it at zero. Returns a snapshot of the
    /// removed units.
    pub fn remove_quantity(&mut self, id: ItemId, quantity: u32) -> Result<Item, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        let idx = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(ValidationError::ItemNotFound(id))?;
        let have = self.items[idx].quantity;
        if have < quantity {
            return Err(ValidationError::InsufficientQuantity {
                id,
                need: quantity,
                have,
            });
        }
        let mut removed = self.items[idx].clone();
        removed.quantity = quantity;
        self.items[idx].quantity -= quantity;
        if self.items[idx].quantity == 0 {
            self.items.remove(idx);
        }
        Ok(removed)
    }

    /// Remove `quantity` units by name, possibly across several entries.
    pub fn remove_named(&mut self, name: &str, quantity: u32) -> Result<(), ValidationError> {
        let have = self.count_named(name);
        if have < quantity {
            return Err(ValidationError::MissingIngredient {
                name: name.to_string(),
                need: quantity,
                have,
            });
        }
        let mut left = quantity;
        for item in self.items.iter_mut().filter(|i| i.name == name) {
            let take = left.min(item.quantity);
            item.quantity -= take;
            left -= take;
            if left == 0 {
                break;
            }
        }
        self.items.retain(|i| i.quantity > 0);
        Ok(())
    }
}

/// Mint `quantity` units of `template` into the character's inventory.
///
/// Stackable kinds merge into one entry; equipment gets one entry per unit.
/// Returns the ids holding the granted units.
pub fn grant(character: &mut Character, template: &ItemTemplate, quantity: u32) -> Vec<ItemId> {
    if quantity == 0 {
        return Vec::new();
    }
    if template.category.is_stackable() {
        let id = character.allocate_item_id();
        let held = character
            .inventory
            .add(template.instantiate(id, quantity));
        return vec![held];
    }
    (0..quantity)
        .map(|_| {
            let id = character.allocate_item_id();
            character.inventory.add(template.instantiate(id, 1))
        })
        .collect()
}

fn ensure_unprotected(character: &Character, id: ItemId) -> Result<(), ValidationError> {
    if character.is_equipped(id) {
        return Err(ValidationError::ItemEquipped(id));
    }
    if character.natal_artifact == Some(id) {
        return Err(ValidationError::NatalArtifactBound(id));
    }
    Ok(())
}

/// Throw away `quantity` units (all of them when `None`).
pub fn discard(
    character: &mut Character,
    id: ItemId,
    quantity: Option<u32>,
) -> Result<Item, ValidationError> {
    if quantity == Some(0) {
        return Err(ValidationError::ZeroQuantity);
    }
    ensure_unprotected(character, id)?;
    let held = character
        .inventory
        .get(id)
        .ok_or(ValidationError::ItemNotFound(id))?
        .quantity;
    character.inventory.remove_quantity(id, quantity.unwrap_or(held))
}

/// Sell units for their sell price. Returns the proceeds.
pub fn sell(character: &mut Character, id: ItemId, quantity: u32) -> Result<u64, ValidationError> {
    if quantity == 0 {
        return Err(ValidationError::ZeroQuantity);
    }
    ensure_unprotected(character, id)?;
    let price = character
        .inventory
        .get(id)
        .ok_or(ValidationError::ItemNotFound(id))?
        .sell_price;
    let proceeds = price
        .checked_mul(u64::from(quantity))
        .ok_or(ValidationError::Overflow("sale proceeds"))?;
    // Remove first so a failed removal leaves the wallet alone.
    character.inventory.remove_quantity(id, quantity)?;
    character.credit_currency(proceeds)?;
    Ok(proceeds)
}

fn equippable_kind(character: &Character, id: ItemId) -> Result<SlotKind, ValidationError> {
    let item = character
        .inventory
        .get(id)
        .ok_or(ValidationError::ItemNotFound(id))?;
    match (item.is_equipment(), item.slot) {
        (true, Some(kind)) => Ok(kind),
        _ => Err(ValidationError::NotEquippable(id)),
    }
}

/// Put an item into `slot`, or the first free slot of its kind when `None`
/// (falling back to the first slot of the kind). An item already worn
/// elsewhere moves. Returns the displaced item, if any.
pub fn equip(
    character: &mut Character,
    id: ItemId,
    slot: Option<EquipmentSlot>,
) -> Result<Option<ItemId>, ValidationError> {
    let kind = equippable_kind(character, id)?;
    let target = match slot {
        Some(s) if s.kind() != kind => return Err(ValidationError::SlotMismatch { slot: s, kind }),
        Some(s) => s,
        None => {
            let slots = kind.slots();
            slots
                .iter()
                .copied()
                .find(|s| !character.equipped.contains_key(s))
                .unwrap_or(slots[0])
        }
    };
    character.equipped.retain(|_, v| *v != id);
    let displaced = character.equipped.insert(target, id);
    debug!(?id, ?target, ?displaced, "equipped");
    Ok(displaced.filter(|d| *d != id))
}

pub fn unequip(character: &mut Character, slot: EquipmentSlot) -> Result<ItemId, ValidationError> {
    character
        .equipped
        .remove(&slot)
        .ok_or(ValidationError::SlotEmpty(slot))
}

/// Bind an artifact as the character's natal artifact.
pub fn set_natal_artifact(character: &mut Character, id: ItemId) -> Result<(), ValidationError> {
    if equippable_kind(character, id)? != SlotKind::Artifact {
        return Err(ValidationError::NotAnArtifact(id));
    }
    character.natal_artifact = Some(id);
    Ok(())
}

pub fn clear_natal_artifact(character: &mut Character) -> Option<ItemId> {
    character.natal_artifact.take()
}
