//! Character lifecycle and build choices.

use ascend_core::{
    recompute, Attribute, Character, CoreError, LogEntry, StatBlock, StateError, ValidationError,
};
use tracing::debug;

use super::{Ctx, Effects};

/// Base-stat increment bought by one attribute point.
pub fn allocation(attribute: Attribute) -> StatBlock {
    let mut gain = StatBlock::ZERO;
    match attribute {
        Attribute::Attack => gain.attack = 5,
        Attribute::Defense => gain.defense = 3,
        Attribute::Hp => gain.max_hp = 20,
        Attribute::Spirit => gain.spirit = 3,
        Attribute::Physique => {
            gain.physique = 3;
            gain.max_hp = 10;
        }
        Attribute::Speed => gain.speed = 2,
    }
    gain
}

/// Fresh level-1 record, with `talent` applied when the catalog knows it.
pub fn new_character<R: ?Sized>(
    name: &str,
    talent: Option<&str>,
    ctx: &Ctx<'_, R>,
) -> Result<(Character, Effects), CoreError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    let mut c = Character::new(name.trim(), ctx.tables);
    let mut fx = Effects::log(LogEntry::special(format!(
        "{} begins the path of cultivation.",
        c.name
    )));
    if let Some(key) = talent {
        let modifier = ctx
            .tables
            .talents
            .get(key)
            .ok_or_else(|| ValidationError::UnknownEntry {
                table: "talent",
                key: key.to_string(),
            })?;
        c.talent = Some(key.to_string());
        fx.push(LogEntry::special(format!(
            "Talent awakened: {}.",
            modifier.name
        )));
    }
    let warnings = recompute(&mut c, ctx.tables);
    c.hp = c.max_hp();
    fx.warnings(&warnings);
    debug!(name = %c.name, talent = ?c.talent, "new character");
    Ok((c, fx))
}

pub fn allocate_attribute<R: ?Sized>(
    c: &mut Character,
    attribute: Attribute,
    ctx: &Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    if c.wallet.attribute_points == 0 {
        return Err(ValidationError::NoAttributePoints.into());
    }
    c.wallet.attribute_points -= 1;
    let gain = allocation(attribute);
    c.base_stats += gain;
    let mut fx = Effects::default();
    fx.warnings(&recompute(c, ctx.tables));
    c.hp = c.hp.saturating_add(gain.max_hp.max(0) as u64).min(c.max_hp());
    fx.push(LogEntry::gain(format!(
        "You focus your training: {}.",
        gain.describe().join(", ")
    )));
    Ok(fx)
}

pub fn select_title<R: ?Sized>(
    c: &mut Character,
    key: &str,
    ctx: &Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    let modifier = ctx
        .tables
        .titles
        .get(key)
        .ok_or_else(|| ValidationError::UnknownEntry {
            table: "title",
            key: key.to_string(),
        })?;
    let before = c.max_hp();
    c.title = Some(key.to_string());
    let mut fx = Effects::default();
    fx.warnings(&recompute(c, ctx.tables));
    let after = c.max_hp();
    if after > before {
        c.hp = c.hp.saturating_add(after - before).min(after);
    }
    fx.push(LogEntry::special(format!(
        "You now bear the title {}.",
        modifier.name
    )));
    Ok(fx)
}

pub fn learn_art<R: ?Sized>(
    c: &mut Character,
    key: &str,
    ctx: &Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    let art = ctx
        .tables
        .arts
        .get(key)
        .ok_or_else(|| ValidationError::UnknownEntry {
            table: "art",
            key: key.to_string(),
        })?;
    if c.arts.iter().any(|a| a == key) {
        return Err(ValidationError::ArtAlreadyLearned(key.to_string()).into());
    }
    if let Some(min) = art.min_realm {
        if c.realm < min {
            return Err(ValidationError::RealmTooLow(min).into());
        }
    }
    c.debit_currency(art.cost)?;
    c.arts.push(key.to_string());
    let mut fx = Effects::default();
    fx.warnings(&recompute(c, ctx.tables));
    fx.push(LogEntry::special(format!(
        "You comprehend the {}.",
        art.name
    )));
    Ok(fx)
}

pub fn revive(c: &mut Character) -> Result<Effects, CoreError> {
    if !c.is_dead() {
        return Err(StateError::CharacterAlive.into());
    }
    c.hp = c.max_hp();
    Ok(Effects::log(LogEntry::special(format!(
        "{} returns from the brink of death.",
        c.name
    ))))
}
