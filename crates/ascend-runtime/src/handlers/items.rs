//! Inventory commands: use, sell, discard, equip and natal refining.

use ascend_core::inventory;
use ascend_core::{
    recompute, Character, Companion, CoreError, EquipmentSlot, ItemCategory, ItemId, LogEntry,
    RandomSource, Rarity, ValidationError,
};

use super::{Ctx, Effects};

fn item_name(c: &Character, id: ItemId) -> Result<String, ValidationError> {
    c.inventory
        .get(id)
        .map(|i| i.name.clone())
        .ok_or(ValidationError::ItemNotFound(id))
}

/// Companion rarities an egg of `rarity` can hatch into.
fn hatch_window(rarity: Rarity) -> &'static [Rarity] {
    match rarity {
        Rarity::Common => &[Rarity::Common, Rarity::Rare],
        Rarity::Rare => &[Rarity::Rare, Rarity::Legendary],
        Rarity::Legendary => &[Rarity::Legendary, Rarity::Immortal],
        Rarity::Immortal => &[Rarity::Immortal],
    }
}

/// Consume one unit and apply everything it carries.
pub fn use_item<R: RandomSource + ?Sized>(
    c: &mut Character,
    id: ItemId,
    ctx: &mut Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    let item = c
        .inventory
        .get(id)
        .cloned()
        .ok_or(ValidationError::ItemNotFound(id))?;
    if !item.category.is_consumable() {
        return Err(ValidationError::NotConsumable(id).into());
    }
    c.inventory.remove_quantity(id, 1)?;
    c.statistics.items_used += 1;

    let tables = ctx.tables;
    let mut fx = Effects::default();
    let mut notes = Vec::new();

    if item.category == ItemCategory::Egg {
        let window = hatch_window(item.rarity);
        let candidates: Vec<_> = tables
            .companions
            .iter()
            .filter(|(_, t)| window.contains(&t.rarity))
            .collect();
        if candidates.is_empty() {
            fx.push(LogEntry::normal(format!(
                "You try to hatch the {}, but nothing stirs.",
                item.name
            )));
        } else {
            let (key, template) = candidates[ctx.rng.next_index(candidates.len())];
            let companion = Companion::from_template(c.allocate_companion_id(), key, template);
            fx.push(LogEntry::special(format!(
                "The {} hatches into {}!",
                item.name, companion.name
            )));
            c.companions.push(companion);
            c.statistics.companions_obtained += 1;
        }
    }

    if item.effect.heal > 0 {
        c.heal(item.effect.heal);
        notes.push(format!("recovered {} hp", item.effect.heal));
    }
    if item.effect.experience > 0 {
        c.gain_experience(item.effect.experience)?;
        notes.push(format!("gained {} cultivation", item.effect.experience));
    }
    if !item.permanent.is_zero() {
        c.base_stats += item.permanent;
        let warnings = recompute(c, tables);
        fx.warnings(&warnings);
        if item.permanent.max_hp > 0 {
            c.hp = c
                .hp
                .saturating_add(item.permanent.max_hp as u64)
                .min(c.max_hp());
        }
        notes.push(format!("permanently {}", item.permanent.describe().join(", ")));
    }

    if let Some(recipe) = &item.teaches {
        if c.recipes.contains(recipe) {
            fx.push(LogEntry::normal(format!(
                "You already know how to refine {recipe}."
            )));
        } else {
            c.recipes.insert(recipe.clone());
            fx.push(LogEntry::special(format!(
                "You study the {} and learn to refine {recipe}!",
                item.name
            )));
        }
    }

    if !notes.is_empty() || item.category == ItemCategory::Pill {
        let mut message = format!("You use the {}.", item.name);
        if !notes.is_empty() {
            message.push_str(&format!(" You {}.", notes.join(", ")));
        }
        fx.push(LogEntry::gain(message));
    }
    Ok(fx)
}

/// Use several units in order, as one update. The first refusal rejects the
/// whole batch; the session then discards the working copy.
pub fn use_items<R: RandomSource + ?Sized>(
    c: &mut Character,
    ids: &[ItemId],
    ctx: &mut Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    let mut fx = Effects::default();
    for &id in ids {
        let used = use_item(c, id, ctx)?;
        fx.logs.extend(used.logs);
    }
    Ok(fx)
}

pub fn sell(c: &mut Character, id: ItemId, quantity: u32) -> Result<Effects, CoreError> {
    let name = item_name(c, id)?;
    let proceeds = inventory::sell(c, id, quantity)?;
    Ok(Effects::log(LogEntry::gain(format!(
        "You sell {name} x{quantity} for {proceeds} spirit stones."
    ))))
}

pub fn discard(c: &mut Character, id: ItemId, quantity: Option<u32>) -> Result<Effects, CoreError> {
    let removed = inventory::discard(c, id, quantity)?;
    Ok(Effects::log(LogEntry::normal(format!(
        "You discard {} x{}.",
        removed.name, removed.quantity
    ))))
}

pub fn equip<R: ?Sized>(
    c: &mut Character,
    id: ItemId,
    slot: Option<EquipmentSlot>,
    ctx: &Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    let name = item_name(c, id)?;
    let displaced = inventory::equip(c, id, slot)?;
    let mut fx = Effects::log(LogEntry::normal(format!("You equip the {name}.")));
    if let Some(old) = displaced {
        if let Ok(old_name) = item_name(c, old) {
            fx.push(LogEntry::normal(format!("You take off the {old_name}.")));
        }
    }
    let warnings = recompute(c, ctx.tables);
    fx.warnings(&warnings);
    Ok(fx)
}

pub fn unequip<R: ?Sized>(
    c: &mut Character,
    slot: EquipmentSlot,
    ctx: &Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    let id = inventory::unequip(c, slot)?;
    let name = item_name(c, id)?;
    let mut fx = Effects::log(LogEntry::normal(format!("You take off the {name}.")));
    let warnings = recompute(c, ctx.tables);
    fx.warnings(&warnings);
    Ok(fx)
}

pub fn refine_natal<R: ?Sized>(
    c: &mut Character,
    id: ItemId,
    ctx: &Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    let name = item_name(c, id)?;
    inventory::set_natal_artifact(c, id)?;
    let mut fx = Effects::log(LogEntry::special(format!(
        "The {name} is refined into your natal artifact."
    )));
    let warnings = recompute(c, ctx.tables);
    fx.warnings(&warnings);
    Ok(fx)
}

pub fn clear_natal<R: ?Sized>(c: &mut Character, ctx: &Ctx<'_, R>) -> Result<Effects, CoreError> {
    let mut fx = match inventory::clear_natal_artifact(c) {
        Some(id) => Effects::log(LogEntry::normal(format!(
            "You sever the bond with {}.",
            item_name(c, id).unwrap_or_else(|_| id.to_string())
        ))),
        None => Effects::log(LogEntry::normal("You have no natal artifact.")),
    };
    let warnings = recompute(c, ctx.tables);
    fx.warnings(&warnings);
    Ok(fx)
}
