//! Breakthrough preconditions and application.

use thiserror::Error;
use tracing::{info, warn};

use ascend_core::{
    recompute, Character, DataIntegrityWarning, Realm, Tables, UnlockKind, MAX_REALM_LEVEL,
};

/// Why a realm crossing cannot happen yet. Nothing is consumed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error("entering {realm} requires a {unlock}")]
    MissingUnlock { realm: Realm, unlock: UnlockKind },
}

/// Requirements for entering `target`. Only realm crossings have any.
pub fn check_conditions(
    character: &Character,
    target: Realm,
    tables: &Tables,
) -> Result<(), ConditionError> {
    let Some(def) = tables.realm(target) else {
        return Ok(());
    };
    match def.requires {
        Some(unlock) if !character.has_unlock(unlock) => Err(ConditionError::MissingUnlock {
            realm: target,
            unlock,
        }),
        _ => Ok(()),
    }
}

/// Realm and sub-level reached by the next breakthrough, or `None` at peak.
pub fn next_step(realm: Realm, level: u8) -> Option<(Realm, u8)> {
    if level < MAX_REALM_LEVEL {
        Some((realm, level + 1))
    } else {
        realm.next().map(|r| (r, 1))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakthroughOutcome {
    pub from: (Realm, u8),
    pub to: (Realm, u8),
    pub hp_lost: u64,
    pub attribute_points: u32,
    pub warnings: Vec<DataIntegrityWarning>,
}

impl BreakthroughOutcome {
    pub fn crossed_realm(&self) -> bool {
        self.from.0 != self.to.0
    }
}

/// Advance one step in place.
///
/// Surplus experience carries over, the reached realm's gains are folded into
/// base stats, stats are recomputed and then `hp_loss` is applied. A
/// surviving character keeps at least 1 hp. Returns `None` at peak.
pub fn apply_breakthrough(
    character: &mut Character,
    tables: &Tables,
    hp_loss: u64,
) -> Option<BreakthroughOutcome> {
    let from = (character.realm, character.realm_level);
    let (realm, level) = next_step(from.0, from.1)?;
    let mut warnings = Vec::new();

    let surplus = character
        .experience
        .saturating_sub(character.experience_threshold);
    character.realm = realm;
    character.realm_level = level;
    character.experience = surplus;
    character.experience_threshold = tables.threshold(realm, level);

    let mut points = 0;
    match tables.realm(realm) {
        Some(def) => {
            character.base_stats += def.gains;
            points = def.attribute_points;
            character.wallet.attribute_points =
                character.wallet.attribute_points.saturating_add(points);
        }
        None => warnings.push(DataIntegrityWarning::new(
            "realm",
            realm.to_string(),
            "no stat gains applied",
        )),
    }
    character.statistics.breakthroughs += 1;
    warnings.extend(recompute(character, tables));

    let before = character.hp;
    if before > 0 {
        character.hp = before.saturating_sub(hp_loss).max(1);
    }
    for w in &warnings {
        warn!(table = w.table, key = %w.key, "breakthrough fallback");
    }
    info!(?from, to = ?(realm, level), surplus, "breakthrough");
    Some(BreakthroughOutcome {
        from,
        to: (realm, level),
        hp_lost: before - character.hp,
        attribute_points: points,
        warnings,
    })
}
