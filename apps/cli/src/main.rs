#![deny(warnings)]

//! Headless driver: replays a scripted idle session against the catalog
//! and prints where the cultivator ended up.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ascend_core::{Attribute, GameConfig, Payoff};
use ascend_runtime::{BattleReport, Command, Dispatch, Session, TracingSink};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Ticks between two scripted battles.
const BATTLE_EVERY: u32 = 20;
const MAX_DRAW_BATCH: u64 = 10;

#[derive(Debug, Default)]
struct Args {
    seed: Option<u64>,
    ticks: Option<u32>,
    draws: Option<u64>,
    catalog: Option<PathBuf>,
    save: Option<PathBuf>,
    version: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--ticks" => args.ticks = it.next().and_then(|s| s.parse().ok()),
            "--draws" => args.draws = it.next().and_then(|s| s.parse().ok()),
            "--catalog" => args.catalog = it.next().map(PathBuf::from),
            "--save" => args.save = it.next().map(PathBuf::from),
            "--version" => args.version = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

/// Answer prompts and deaths the way an idle player would: always face the
/// tribulation, revive after a fall.
fn settle(session: &mut Session<impl ascend_core::RandomSource, TracingSink>, d: Dispatch) {
    if d.prompt.is_some() {
        session.dispatch(Command::ConfirmTribulation);
        let outcome = session.dispatch(Command::RollTribulation);
        if outcome.died {
            session.dispatch(Command::Revive);
        }
    } else if d.died {
        session.dispatch(Command::Revive);
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    if args.version {
        println!("ascend {}", env!("ASCEND_BUILD"));
        return Ok(());
    }
    info!(?args, "starting CLI");

    let tables = match &args.catalog {
        Some(dir) => catalog::load_dir(dir)
            .with_context(|| format!("loading catalog from {}", dir.display()))?,
        None => catalog::builtin().context("parsing built-in catalog")?,
    };
    let warnings = catalog::validate(&tables)?;
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "catalog has unresolved references");
    }

    let config = GameConfig {
        rng_seed: args.seed.unwrap_or(GameConfig::default().rng_seed),
        ..GameConfig::default()
    };
    let mut session = Session::seeded(Arc::new(tables), config, TracingSink);
    let d = session.dispatch(Command::NewGame {
        name: "Han Li".into(),
        talent: Some("spirit_root".into()),
    });
    if let Some(err) = d.error {
        anyhow::bail!("could not start a new game: {err}");
    }

    let ticks = args.ticks.unwrap_or(600);
    for tick in 1..=ticks {
        let realm_index = session.character().map_or(0, |c| c.realm.index() as u64);
        let d = session.dispatch(Command::GainExperience(10 * (realm_index + 1)));
        settle(&mut session, d);
        session.dispatch(Command::Tick);

        if tick % BATTLE_EVERY == 0 {
            let d = session.dispatch(Command::BattleResult(BattleReport {
                victory: true,
                hp_loss: 15,
                experience: 40,
                currency: 60,
                drops: vec![Payoff::Ticket { amount: 1 }],
            }));
            settle(&mut session, d);
        }
        while session
            .character()
            .is_some_and(|c| c.wallet.attribute_points > 0)
        {
            session.dispatch(Command::AllocateAttribute(Attribute::Attack));
        }
    }

    let mut remaining = args.draws.unwrap_or(0);
    while remaining > 0 {
        let tickets = session.character().map_or(0, |c| c.wallet.tickets);
        let batch = remaining.min(tickets).min(MAX_DRAW_BATCH);
        if batch == 0 {
            warn!(remaining, "out of draw tickets");
            break;
        }
        let d = session.dispatch(Command::Draw {
            table: "lottery".into(),
            count: batch as u32,
        });
        if d.error.is_some() {
            break;
        }
        settle(&mut session, d);
        remaining -= batch;
    }

    let c = session
        .character()
        .context("session ended without a character")?;
    println!(
        "{} | {} level {} | exp {}/{} | hp {}/{}",
        c.name,
        c.realm,
        c.realm_level,
        c.experience,
        c.experience_threshold,
        c.hp,
        c.max_hp()
    );
    println!(
        "stones {} | tickets {} | draws {} | items {} | companions {} | breakthroughs {} | kills {}",
        c.wallet.currency,
        c.wallet.tickets,
        c.lifetime_draws,
        c.inventory.len(),
        c.companions.len(),
        c.statistics.breakthroughs,
        c.statistics.kills
    );
    for (kind, variant) in &c.unlocks {
        println!("unlock | {kind}: {variant}");
    }
    for rule in &c.longevity_rules {
        println!("longevity rule | {rule}");
    }

    if let Some(path) = &args.save {
        persistence::save_to(path, c).with_context(|| format!("saving to {}", path.display()))?;
        println!("saved to {}", path.display());
    }
    Ok(())
}
