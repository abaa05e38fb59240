//! Applying the outcome of a battle fought elsewhere.

use ascend_core::{Character, CoreError, LogEntry, RandomSource};
use ascend_rewards::grant_payoffs;

use super::{Ctx, Effects};
use crate::command::BattleReport;

/// Add a signed delta to an unsigned pool, flooring at zero.
fn apply_signed(pool: u64, delta: i64) -> u64 {
    if delta >= 0 {
        pool.saturating_add(delta as u64)
    } else {
        pool.saturating_sub(delta.unsigned_abs())
    }
}

pub fn battle_result<R: RandomSource + ?Sized>(
    c: &mut Character,
    report: &BattleReport,
    ctx: &mut Ctx<'_, R>,
) -> Result<Effects, CoreError> {
    c.hp = c.hp.saturating_sub(report.hp_loss);
    c.experience = apply_signed(c.experience, report.experience);
    c.wallet.currency = apply_signed(c.wallet.currency, report.currency);

    let mut fx = Effects::default();
    if report.victory {
        c.statistics.kills += 1;
        fx.push(LogEntry::gain(format!(
            "Victory! {:+} cultivation, {:+} spirit stones.",
            report.experience, report.currency
        )));
        if !report.drops.is_empty() {
            let resolution = grant_payoffs(c, &report.drops, ctx.tables, &mut *ctx.rng)?;
            fx.absorb(c, resolution);
        }
    } else {
        fx.push(LogEntry::danger(format!(
            "Defeat. You lose {} hp, {:+} cultivation, {:+} spirit stones.",
            report.hp_loss, report.experience, report.currency
        )));
    }
    if c.is_dead() {
        fx.push(LogEntry::danger(format!("{} has fallen in battle.", c.name)));
    }
    Ok(fx)
}
