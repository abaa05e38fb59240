//! Buying from the market and refining with known recipes.

use ascend_core::{Character, CoreError, LogEntry, Payoff, RandomSource, ValidationError};
use ascend_rewards::grant_payoffs;
use tracing::debug;

use super::{Ctx, Effects};

pub fn buy<R: RandomSource + ?Sized>(
    c: &mut Character,
    template: &str,
    quantity: u32,
    unit_price: u64,
    ctx: &mut Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    let tables = ctx.tables;
    let item = tables
        .item(template)
        .ok_or_else(|| ValidationError::UnknownEntry {
            table: "item",
            key: template.to_string(),
        })?;
    let total = unit_price
        .checked_mul(u64::from(quantity))
        .ok_or(ValidationError::Overflow("price"))?;
    c.debit_currency(total)?;
    let mut fx = Effects::log(LogEntry::normal(format!(
        "You pay {total} spirit stones for {} x{quantity}.",
        item.name
    )));
    let payoff = Payoff::Item {
        template: template.to_string(),
        quantity,
    };
    let resolution = grant_payoffs(c, &[payoff], tables, &mut *ctx.rng)?;
    fx.absorb(c, resolution);
    Ok(fx)
}

pub fn craft<R: RandomSource + ?Sized>(
    c: &mut Character,
    key: &str,
    ctx: &mut Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    let tables = ctx.tables;
    let recipe = tables
        .recipes
        .get(key)
        .ok_or_else(|| ValidationError::UnknownEntry {
            table: "recipe",
            key: key.to_string(),
        })?;
    if !c.recipes.contains(key) {
        return Err(ValidationError::RecipeUnknown(recipe.name.clone()).into());
    }
    for ingredient in &recipe.ingredients {
        c.inventory
            .remove_named(&ingredient.name, ingredient.quantity)?;
    }
    c.debit_currency(recipe.cost)?;
    debug!(recipe = key, "crafting");

    let mut fx = Effects::log(LogEntry::normal(format!(
        "The cauldron roars as you refine {}.",
        recipe.name
    )));
    let payoff = Payoff::Item {
        template: recipe.output.clone(),
        quantity: 1,
    };
    let resolution = grant_payoffs(c, &[payoff], tables, &mut *ctx.rng)?;
    fx.absorb(c, resolution);
    Ok(fx)
}
