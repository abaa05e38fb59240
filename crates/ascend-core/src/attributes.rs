//! Attribute aggregation.
//!
//! Effective stats are `base + talent + title + Σarts + Σequipment`, with the
//! natal artifact's bonus scaled by [`NATAL_NUMERATOR`]/[`NATAL_DENOMINATOR`]
//! and every field floored at zero. The computation is integer-only, so
//! recomputing on unchanged inputs is bit-identical.
//!
//! Permanent item effects, allocated points and breakthrough gains are not
//! inputs here: they were already folded into `base` when they happened.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::character::Character;
use crate::error::DataIntegrityWarning;
use crate::stats::StatBlock;
use crate::tables::Tables;

pub const NATAL_NUMERATOR: i64 = 3;
pub const NATAL_DENOMINATOR: i64 = 2;

/// One equipped item as seen by the aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EquippedContribution {
    pub bonus: StatBlock,
    pub natal: bool,
}

impl EquippedContribution {
    pub fn effective(&self) -> StatBlock {
        if self.natal {
            self.bonus.scaled(NATAL_NUMERATOR, NATAL_DENOMINATOR)
        } else {
            self.bonus
        }
    }
}

pub fn effective_stats(
    base: &StatBlock,
    talent: Option<&StatBlock>,
    title: Option<&StatBlock>,
    arts: &[StatBlock],
    equipped: &[EquippedContribution],
) -> StatBlock {
    let mut total = *base;
    total += talent.copied().unwrap_or_default();
    total += title.copied().unwrap_or_default();
    total += arts.iter().sum::<StatBlock>();
    for e in equipped {
        total += e.effective();
    }
    total.clamped()
}

/// Per-source breakdown for the character sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSources {
    pub base: StatBlock,
    pub talent: StatBlock,
    pub title: StatBlock,
    pub arts: StatBlock,
    pub equipment: StatBlock,
}

impl AttributeSources {
    pub fn total(&self) -> StatBlock {
        (self.base + self.talent + self.title + self.arts + self.equipment).clamped()
    }
}

struct Inputs {
    talent: Option<StatBlock>,
    title: Option<StatBlock>,
    arts: Vec<StatBlock>,
    equipped: Vec<EquippedContribution>,
}

fn gather(character: &Character, tables: &Tables) -> (Inputs, Vec<DataIntegrityWarning>) {
    let mut warnings = Vec::new();

    let talent = character.talent.as_deref().and_then(|key| {
        let found = tables.talents.get(key).map(|m| m.effects);
        if found.is_none() {
            warnings.push(DataIntegrityWarning::new("talent", key, "contribution ignored"));
        }
        found
    });
    let title = character.title.as_deref().and_then(|key| {
        let found = tables.titles.get(key).map(|m| m.effects);
        if found.is_none() {
            warnings.push(DataIntegrityWarning::new("title", key, "contribution ignored"));
        }
        found
    });
    let mut arts = Vec::with_capacity(character.arts.len());
    for key in &character.arts {
        match tables.arts.get(key) {
            Some(m) => arts.push(m.effects),
            None => warnings.push(DataIntegrityWarning::new("art", key, "contribution ignored")),
        }
    }
    let mut equipped = Vec::with_capacity(character.equipped.len());
    for id in character.equipped.values() {
        match character.inventory.get(*id) {
            Some(item) => equipped.push(EquippedContribution {
                bonus: item.bonus,
                natal: character.natal_artifact == Some(*id),
            }),
            None => warnings.push(DataIntegrityWarning::new(
                "inventory",
                id.to_string(),
                "equipped slot ignored",
            )),
        }
    }

    for w in &warnings {
        warn!(table = w.table, key = %w.key, "unresolved stat source");
    }
    (
        Inputs {
            talent,
            title,
            arts,
            equipped,
        },
        warnings,
    )
}

pub fn attribute_sources(
    character: &Character,
    tables: &Tables,
) -> (AttributeSources, Vec<DataIntegrityWarning>) {
    let (inputs, warnings) = gather(character, tables);
    let sources = AttributeSources {
        base: character.base_stats,
        talent: inputs.talent.unwrap_or_default(),
        title: inputs.title.unwrap_or_default(),
        arts: inputs.arts.iter().sum(),
        equipment: inputs.equipped.iter().map(|e| e.effective()).fold(
            StatBlock::ZERO,
            |acc, s| acc + s,
        ),
    };
    (sources, warnings)
}

/// Refresh the cached stats from the current inputs and clamp hp to the new
/// max. Returns the unresolved references that were skipped.
pub fn recompute(character: &mut Character, tables: &Tables) -> Vec<DataIntegrityWarning> {
    let (inputs, warnings) = gather(character, tables);
    character.stats = effective_stats(
        &character.base_stats,
        inputs.talent.as_ref(),
        inputs.title.as_ref(),
        &inputs.arts,
        &inputs.equipped,
    );
    character.hp = character.hp.min(character.max_hp());
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{equip, grant, set_natal_artifact};
    use crate::item::{ItemCategory, ItemTemplate, SlotKind};
    use crate::realm::Rarity;
    use crate::tables::Modifier;
    use proptest::prelude::*;

    fn block(attack: i64, max_hp: i64) -> StatBlock {
        StatBlock {
            attack,
            max_hp,
            ..StatBlock::ZERO
        }
    }

    fn modifier(name: &str, effects: StatBlock) -> Modifier {
        Modifier {
            name: name.into(),
            effects,
            cost: 0,
            min_realm: None,
        }
    }

    fn artifact() -> ItemTemplate {
        ItemTemplate {
            name: "Green Bamboo Bee Cloud Sword".into(),
            category: ItemCategory::Equipment,
            rarity: Rarity::Rare,
            effect: Default::default(),
            permanent: StatBlock::ZERO,
            bonus: block(15, 0),
            slot: Some(SlotKind::Artifact),
            sell_price: 0,
            teaches: None,
        }
    }

    #[test]
    fn sums_every_source() {
        let eq = [EquippedContribution {
            bonus: block(4, 0),
            natal: false,
        }];
        let s = effective_stats(
            &block(10, 100),
            Some(&block(1, 0)),
            Some(&block(2, 10)),
            &[block(3, 0)],
            &eq,
        );
        assert_eq!(s.attack, 20);
        assert_eq!(s.max_hp, 110);
    }

    #[test]
    fn natal_bonus_is_scaled() {
        let eq = [EquippedContribution {
            bonus: block(15, 0),
            natal: true,
        }];
        let s = effective_stats(&StatBlock::ZERO, None, None, &[], &eq);
        assert_eq!(s.attack, 22);
    }

    #[test]
    fn negative_totals_clamp_to_zero() {
        let s = effective_stats(&block(5, 0), Some(&block(-8, 0)), None, &[], &[]);
        assert_eq!(s.attack, 0);
    }

    #[test]
    fn recompute_reads_catalog_and_clamps_hp() {
        let mut tables = Tables::default();
        tables
            .titles
            .insert("wanderer".into(), modifier("Wanderer", block(0, -50)));
        let mut c = Character::new("Han Li", &tables);
        c.title = Some("wanderer".into());
        let warnings = recompute(&mut c, &tables);
        assert!(warnings.is_empty());
        assert_eq!(c.max_hp(), 50);
        assert_eq!(c.hp, 50);
    }

    #[test]
    fn missing_modifiers_warn_and_are_ignored() {
        let tables = Tables::default();
        let mut c = Character::new("Han Li", &tables);
        c.talent = Some("lost".into());
        c.arts.push("forgotten".into());
        let before = c.base_stats;
        let warnings = recompute(&mut c, &tables);
        assert_eq!(warnings.len(), 2);
        assert_eq!(c.stats, before);
    }

    #[test]
    fn sources_total_matches_recompute() {
        let tables = Tables::default();
        let mut c = Character::new("Han Li", &tables);
        let id = grant(&mut c, &artifact(), 1)[0];
        equip(&mut c, id, None).unwrap();
        set_natal_artifact(&mut c, id).unwrap();
        recompute(&mut c, &tables);
        let (sources, _) = attribute_sources(&c, &tables);
        assert_eq!(sources.equipment.attack, 22);
        assert_eq!(sources.total(), c.stats);
    }

    #[test]
    fn unequipped_natal_artifact_contributes_nothing() {
        let tables = Tables::default();
        let mut c = Character::new("Han Li", &tables);
        let id = grant(&mut c, &artifact(), 1)[0];
        set_natal_artifact(&mut c, id).unwrap();
        recompute(&mut c, &tables);
        assert_eq!(c.stats, c.base_stats);
    }

    fn arb_block() -> impl Strategy<Value = StatBlock> {
        (
            -1_000i64..1_000,
            -1_000i64..1_000,
            -1_000i64..1_000,
            -1_000i64..1_000,
            -1_000i64..1_000,
            -1_000i64..1_000,
        )
            .prop_map(|(attack, defense, max_hp, spirit, physique, speed)| StatBlock {
                attack,
                defense,
                max_hp,
                spirit,
                physique,
                speed,
            })
    }

    proptest! {
        #[test]
        fn aggregation_is_idempotent(
            base in arb_block(),
            talent in proptest::option::of(arb_block()),
            arts in proptest::collection::vec(arb_block(), 0..4),
            eq in proptest::collection::vec((arb_block(), any::<bool>()), 0..6),
        ) {
            let equipped: Vec<_> = eq
                .into_iter()
                .map(|(bonus, natal)| EquippedContribution { bonus, natal })
                .collect();
            let a = effective_stats(&base, talent.as_ref(), None, &arts, &equipped);
            let b = effective_stats(&base, talent.as_ref(), None, &arts, &equipped);
            prop_assert_eq!(a, b);
            prop_assert!(a.attack >= 0 && a.max_hp >= 0 && a.speed >= 0);
        }

        #[test]
        fn recompute_keeps_hp_within_max(hp in 0u64..10_000, max in -50i64..5_000) {
            let tables = Tables::default();
            let mut c = Character::new("Han Li", &tables);
            c.base_stats.max_hp = max;
            c.hp = hp;
            recompute(&mut c, &tables);
            prop_assert!(c.hp <= c.max_hp());
            let first = c.stats;
            recompute(&mut c, &tables);
            prop_assert_eq!(first, c.stats);
        }
    }
}
