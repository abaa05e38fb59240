//! Applies payoffs to a character as one atomic mutation.
//!
//! The resolver works on a clone of the record and hands it back only when
//! every payoff applied; any error leaves the caller's record untouched.

use tracing::{info, warn};

use ascend_core::inventory::grant;
use ascend_core::{
    Character, Companion, DataIntegrityWarning, LogEntry, Payoff, RandomSource, Tables,
    UnlockKind, ValidationError,
};

use crate::sampling::draw_batch;
use crate::summary::RewardSummary;

/// Outcome of one resolver invocation.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// The updated record. Commit it as a whole or not at all.
    pub character: Character,
    pub summary: RewardSummary,
    /// Noteworthy events worth their own log line (unlocks, companions,
    /// duplicate conversions).
    pub logs: Vec<LogEntry>,
    pub warnings: Vec<DataIntegrityWarning>,
}

struct Resolver<'a, R: ?Sized> {
    character: Character,
    tables: &'a Tables,
    rng: &'a mut R,
    summary: RewardSummary,
    logs: Vec<LogEntry>,
    warnings: Vec<DataIntegrityWarning>,
}

impl<'a, R: RandomSource + ?Sized> Resolver<'a, R> {
    fn new(character: &Character, tables: &'a Tables, rng: &'a mut R) -> Self {
        Self {
            character: character.clone(),
            tables,
            rng,
            summary: RewardSummary::default(),
            logs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, w: DataIntegrityWarning) {
        warn!(table = w.table, key = %w.key, "reward reference unresolved");
        self.logs.push(LogEntry::from(&w));
        self.warnings.push(w);
    }

    fn credit(&mut self, amount: u64) -> Result<(), ValidationError> {
        self.character.credit_currency(amount)?;
        self.summary.add_currency(amount);
        Ok(())
    }

    fn apply(&mut self, payoff: &Payoff) -> Result<(), ValidationError> {
        let tables = self.tables;
        match payoff {
            Payoff::Currency { amount } => self.credit(*amount)?,
            Payoff::Experience { amount } => {
                self.character.gain_experience(*amount)?;
                self.summary.add_experience(*amount);
            }
            Payoff::Ticket { amount } => {
                let wallet = &mut self.character.wallet;
                wallet.tickets = wallet
                    .tickets
                    .checked_add(*amount)
                    .ok_or(ValidationError::Overflow("tickets"))?;
                self.summary.add_tickets(*amount);
            }
            Payoff::Item { template, quantity } => match tables.item(template) {
                Some(tpl) => {
                    grant(&mut self.character, tpl, *quantity);
                    self.summary.add_item(&tpl.name, *quantity);
                }
                None => self.warn(DataIntegrityWarning::new("item", template, "payoff skipped")),
            },
            Payoff::Companion { template } => match tables.companion(template) {
                Some(tpl) => {
                    let id = self.character.allocate_companion_id();
                    let companion = Companion::from_template(id, template, tpl);
                    self.logs
                        .push(LogEntry::special(format!("A {} joins you!", companion.name)));
                    self.summary.add_companion(&companion.name);
                    self.character.companions.push(companion);
                    self.character.statistics.companions_obtained += 1;
                }
                None => {
                    self.warn(DataIntegrityWarning::new("companion", template, "payoff skipped"))
                }
            },
            Payoff::SingletonUnlock {
                unlock,
                fallback_currency,
            } => self.apply_singleton(*unlock, *fallback_currency)?,
            Payoff::LongevityRule { fallback_currency } => {
                self.apply_longevity_rule(*fallback_currency)?
            }
        }
        Ok(())
    }

    fn apply_singleton(&mut self, unlock: UnlockKind, fallback: u64) -> Result<(), ValidationError> {
        if self.character.has_unlock(unlock) {
            return self.convert(fallback, &format!("You already hold a {unlock}"));
        }
        let tables = self.tables;
        let variant = match tables.unlocks.get(&unlock) {
            Some(variants) if !variants.is_empty() => {
                variants[self.rng.next_index(variants.len())].clone()
            }
            _ => {
                self.warn(DataIntegrityWarning::new(
                    "unlock",
                    unlock.to_string(),
                    "paid out as currency",
                ));
                return self.credit(fallback);
            }
        };
        info!(%unlock, %variant, "singleton unlock acquired");
        self.logs.push(LogEntry::special(format!(
            "Obtained the {unlock} [{variant}]! A key to the next realm."
        )));
        self.summary.add_unlock(unlock, &variant);
        self.character.unlocks.insert(unlock, variant);
        Ok(())
    }

    fn convert(&mut self, fallback: u64, reason: &str) -> Result<(), ValidationError> {
        self.credit(fallback)?;
        self.summary.converted_singletons += 1;
        self.logs.push(LogEntry::gain(format!(
            "{reason}; converted to {fallback} spirit stones"
        )));
        Ok(())
    }

    fn apply_longevity_rule(&mut self, fallback: u64) -> Result<(), ValidationError> {
        if !self.character.can_take_longevity_rule() {
            return self.convert(fallback, "You already hold the most longevity rules you can bear");
        }
        let tables = self.tables;
        if tables.longevity_rules.is_empty() {
            self.warn(DataIntegrityWarning::new(
                "longevity_rule",
                "*",
                "paid out as currency",
            ));
            return self.credit(fallback);
        }
        let held = &self.character.longevity_rules;
        let available: Vec<&String> = tables
            .longevity_rules
            .iter()
            .filter(|r| !held.contains(r))
            .collect();
        if available.is_empty() {
            return self.convert(fallback, "You already hold every longevity rule");
        }
        let rule = available[self.rng.next_index(available.len())].clone();
        info!(%rule, "longevity rule acquired");
        self.logs.push(LogEntry::special(format!(
            "Comprehended the longevity rule [{rule}]! The laws of heaven and earth answer you."
        )));
        self.summary.add_longevity_rule(&rule);
        self.character.longevity_rules.push(rule);
        Ok(())
    }

    fn finish(self) -> Resolution {
        Resolution {
            character: self.character,
            summary: self.summary,
            logs: self.logs,
            warnings: self.warnings,
        }
    }
}

/// Apply a fixed list of payoffs (battle drops, purchases, crafting output).
pub fn grant_payoffs<R: RandomSource + ?Sized>(
    character: &Character,
    payoffs: &[Payoff],
    tables: &Tables,
    rng: &mut R,
) -> Result<Resolution, ValidationError> {
    let mut resolver = Resolver::new(character, tables, rng);
    for payoff in payoffs {
        resolver.apply(payoff)?;
    }
    Ok(resolver.finish())
}

/// Spend `count` tickets on the reward table `table_key`.
///
/// Tickets are deducted and the lifetime draw count advanced before payoffs
/// apply, so ticket payoffs from this batch are spendable afterwards.
pub fn draw<R: RandomSource + ?Sized>(
    character: &Character,
    table_key: &str,
    count: u32,
    tables: &Tables,
    rng: &mut R,
) -> Result<Resolution, ValidationError> {
    if count == 0 {
        return Err(ValidationError::ZeroDraws);
    }
    let need = u64::from(count);
    if character.wallet.tickets < need {
        return Err(ValidationError::InsufficientTickets {
            need,
            have: character.wallet.tickets,
        });
    }
    let table = tables
        .reward_table(table_key)
        .ok_or_else(|| ValidationError::UnknownEntry {
            table: "reward",
            key: table_key.to_string(),
        })?;
    if table.is_empty() {
        return Err(ValidationError::EmptyRewardTable(table_key.to_string()));
    }

    let lifetime_before = character.lifetime_draws;
    let mut resolver = Resolver::new(character, tables, rng);
    let picks = draw_batch(table, lifetime_before, count, &mut *resolver.rng);
    resolver.character.wallet.tickets -= need;
    resolver.character.lifetime_draws = lifetime_before
        .checked_add(need)
        .ok_or(ValidationError::Overflow("lifetime draws"))?;

    for i in picks {
        let entry = &table.entries[i];
        resolver.summary.note_rarity(entry.rarity);
        resolver.apply(&entry.payoff)?;
    }
    info!(table = table_key, count, lifetime = lifetime_before + need, "draw resolved");
    Ok(resolver.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::RewardKind;
    use ascend_core::{
        CompanionStats, CompanionTemplate, ItemCategory, ItemTemplate, Rarity, RewardEntry,
        RewardTable, ScriptedSource, StatBlock,
    };

    fn pill() -> ItemTemplate {
        ItemTemplate {
            name: "Qi-Gathering Pill".into(),
            category: ItemCategory::Pill,
            rarity: Rarity::Common,
            effect: Default::default(),
            permanent: StatBlock::ZERO,
            bonus: StatBlock::ZERO,
            slot: None,
            sell_price: 5,
            teaches: None,
        }
    }

    fn tables() -> Tables {
        let mut t = Tables::default();
        t.items.insert("qi_pill".into(), pill());
        t.companions.insert(
            "fox".into(),
            CompanionTemplate {
                name: "Spirit Fox".into(),
                species: "fox".into(),
                rarity: Rarity::Rare,
                base_stats: CompanionStats {
                    attack: 12,
                    defense: 6,
                    hp: 80,
                    speed: 15,
                },
                skills: vec!["Fox Fire".into()],
            },
        );
        t.unlocks.insert(
            UnlockKind::FoundationTreasure,
            vec!["Jade Lotus".into(), "Nine-Turn Cauldron".into()],
        );
        t.rewards.insert(
            "treasure".into(),
            RewardTable::new(vec![RewardEntry {
                weight: 1,
                rarity: Rarity::Legendary,
                payoff: Payoff::SingletonUnlock {
                    unlock: UnlockKind::FoundationTreasure,
                    fallback_currency: 1_000,
                },
            }]),
        );
        t.rewards.insert(
            "pills".into(),
            RewardTable::new(vec![
                RewardEntry {
                    weight: 9,
                    rarity: Rarity::Common,
                    payoff: Payoff::Item {
                        template: "qi_pill".into(),
                        quantity: 1,
                    },
                },
                RewardEntry {
                    weight: 1,
                    rarity: Rarity::Rare,
                    payoff: Payoff::Companion {
                        template: "fox".into(),
                    },
                },
            ]),
        );
        t
    }

    fn hero(tickets: u64) -> Character {
        let mut c = Character::new("Han Li", &Tables::default());
        c.wallet.tickets = tickets;
        c
    }

    #[test]
    fn held_singleton_converts_to_fallback_currency() {
        let t = tables();
        let mut c = hero(1);
        c.unlocks
            .insert(UnlockKind::FoundationTreasure, "Jade Lotus".into());
        let mut rng = ScriptedSource::new([0.3]);
        let res = draw(&c, "treasure", 1, &t, &mut rng).unwrap();
        assert_eq!(res.character.wallet.currency, 1_000);
        assert_eq!(res.character.unlocks.len(), 1);
        assert_eq!(
            res.character.unlocks[&UnlockKind::FoundationTreasure],
            "Jade Lotus"
        );
        assert_eq!(res.summary.converted_singletons, 1);
    }

    #[test]
    fn singleton_granted_once_per_batch() {
        let t = tables();
        let mut rng = ScriptedSource::new([0.0, 0.0, 0.9]);
        let c = hero(2);
        let res = draw(&c, "treasure", 2, &t, &mut rng).unwrap();
        assert_eq!(
            res.character.unlocks[&UnlockKind::FoundationTreasure],
            "Nine-Turn Cauldron"
        );
        assert_eq!(res.character.wallet.currency, 1_000);
        assert_eq!(res.character.wallet.tickets, 0);
    }

    #[test]
    fn draw_spends_tickets_and_counts_lifetime() {
        let t = tables();
        let c = hero(10);
        let mut rng = ScriptedSource::new(vec![0.0; 10]).with_fallback(0.95);
        let res = draw(&c, "pills", 10, &t, &mut rng).unwrap();
        assert_eq!(res.character.wallet.tickets, 0);
        assert_eq!(res.character.lifetime_draws, 10);
        // Nine pills stack into one entry; pity turned the tenth into the fox.
        assert_eq!(res.character.inventory.len(), 1);
        assert_eq!(res.character.inventory.count_named("Qi-Gathering Pill"), 9);
        assert_eq!(res.character.companions.len(), 1);
        assert_eq!(res.character.companions[0].stats.attack, 12);
        assert_eq!(res.character.companions[0].max_exp, 60);
        assert_eq!(res.summary.quantity_of(RewardKind::Item, "Qi-Gathering Pill"), 9);
        assert_eq!(res.summary.best_rarity, Some(Rarity::Rare));
    }

    #[test]
    fn insufficient_tickets_and_zero_draws_are_rejected() {
        let t = tables();
        let mut rng = ScriptedSource::new(Vec::new());
        assert_eq!(
            draw(&hero(3), "pills", 10, &t, &mut rng).unwrap_err(),
            ValidationError::InsufficientTickets { need: 10, have: 3 }
        );
        assert_eq!(
            draw(&hero(3), "pills", 0, &t, &mut rng).unwrap_err(),
            ValidationError::ZeroDraws
        );
        assert!(matches!(
            draw(&hero(3), "nope", 1, &t, &mut rng).unwrap_err(),
            ValidationError::UnknownEntry { .. }
        ));
    }

    #[test]
    fn missing_templates_warn_and_skip() {
        let t = tables();
        let c = hero(0);
        let mut rng = ScriptedSource::new(Vec::new());
        let res = grant_payoffs(
            &c,
            &[
                Payoff::Item {
                    template: "ghost".into(),
                    quantity: 1,
                },
                Payoff::Currency { amount: 7 },
            ],
            &t,
            &mut rng,
        )
        .unwrap();
        assert_eq!(res.warnings.len(), 1);
        assert_eq!(res.character.wallet.currency, 7);
        assert!(res.character.inventory.is_empty());
    }

    fn with_rules(mut t: Tables) -> Tables {
        t.longevity_rules = vec!["Rule of Time".into(), "Rule of Space".into()];
        t.rewards.insert(
            "rules".into(),
            RewardTable::new(vec![RewardEntry {
                weight: 1,
                rarity: Rarity::Immortal,
                payoff: Payoff::LongevityRule {
                    fallback_currency: 20_000,
                },
            }]),
        );
        t
    }

    #[test]
    fn longevity_rules_are_distinct_then_convert() {
        let t = with_rules(tables());
        let c = hero(3);
        let mut rng = ScriptedSource::new([0.0, 0.0, 0.0, 0.0]);
        let res = draw(&c, "rules", 3, &t, &mut rng).unwrap();
        assert_eq!(
            res.character.longevity_rules,
            vec!["Rule of Time".to_string(), "Rule of Space".to_string()]
        );
        assert_eq!(res.character.wallet.currency, 20_000);
        assert_eq!(res.summary.converted_singletons, 1);
        assert_eq!(
            res.summary
                .quantity_of(RewardKind::Unlock, "longevity rule: Rule of Space"),
            1
        );
    }

    #[test]
    fn longevity_rule_cap_converts_to_currency() {
        let t = with_rules(tables());
        let mut c = hero(1);
        c.max_longevity_rules = 1;
        c.longevity_rules.push("Rule of Space".into());
        let mut rng = ScriptedSource::new(Vec::new());
        let res = draw(&c, "rules", 1, &t, &mut rng).unwrap();
        assert_eq!(res.character.longevity_rules, vec!["Rule of Space".to_string()]);
        assert_eq!(res.character.wallet.currency, 20_000);
    }

    #[test]
    fn overflow_leaves_record_untouched() {
        let t = tables();
        let mut c = hero(0);
        c.wallet.currency = u64::MAX;
        let mut rng = ScriptedSource::new(Vec::new());
        let err = grant_payoffs(
            &c,
            &[
                Payoff::Experience { amount: 5 },
                Payoff::Currency { amount: 1 },
            ],
            &t,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::Overflow("currency"));
        assert_eq!(c.experience, 0);
    }
}
