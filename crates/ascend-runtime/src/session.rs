//! The single owned game store.
//!
//! A [`Session`] owns the character record, the progression phase and the
//! collaborators every reducer needs. [`Session::dispatch`] is the only way
//! to change anything: it runs one command against a working copy, commits
//! the copy when the command succeeds, then gives the breakthrough machine
//! one chance to react.

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use ascend_core::{
    recompute, seeded, validate_character, Character, CoreError, GameConfig, LogEntry,
    RandomSource, Realm, StateError, Tables,
};
use ascend_progression::{
    cancel, confirm, evaluate, resolve, ConfirmationRequest, ProgressionEvent, ProgressionPhase,
    Step,
};
use ascend_rewards::{draw, RewardSummary};

use crate::command::Command;
use crate::handlers::{battle, character, items, regen, shop, Ctx, Effects};
use crate::sink::LogSink;

/// Everything one dispatched command produced.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub logs: Vec<LogEntry>,
    pub summary: Option<RewardSummary>,
    /// Set when a tribulation is waiting for the player's answer.
    pub prompt: Option<ConfirmationRequest>,
    pub events: Vec<ProgressionEvent>,
    /// The character was alive before this command and is dead after it.
    pub died: bool,
    /// The rejection, if the command was refused. Already logged.
    pub error: Option<CoreError>,
}

impl Dispatch {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn take_step(&mut self, step: &mut Step) {
        self.logs.append(&mut step.logs);
        self.events.append(&mut step.events);
        if let Some(prompt) = step.prompt.take() {
            self.prompt = Some(prompt);
        }
    }

    fn take_effects(&mut self, fx: Effects) {
        self.logs.extend(fx.logs);
        if fx.summary.is_some() {
            self.summary = fx.summary;
        }
    }
}

/// Inputs of the last detection cycle. Evaluating twice on the same key
/// cannot change anything, so the session skips it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ProgressKey {
    experience: u64,
    threshold: u64,
    realm: Realm,
    level: u8,
    tribulation_open: bool,
    dead: bool,
}

impl ProgressKey {
    fn of(c: &Character, phase: &ProgressionPhase) -> Self {
        Self {
            experience: c.experience,
            threshold: c.experience_threshold,
            realm: c.realm,
            level: c.realm_level,
            tribulation_open: phase.is_tribulation_open(),
            dead: c.is_dead(),
        }
    }
}

pub struct Session<R, S> {
    tables: Arc<Tables>,
    config: GameConfig,
    character: Option<Character>,
    phase: ProgressionPhase,
    cooldown: u32,
    last_evaluated: Option<ProgressKey>,
    rng: R,
    sink: S,
}

impl<S: LogSink> Session<ChaCha8Rng, S> {
    /// Session driven by a ChaCha generator seeded from `config.rng_seed`.
    pub fn seeded(tables: Arc<Tables>, config: GameConfig, sink: S) -> Self {
        let rng = seeded(config.rng_seed);
        Self::new(tables, config, rng, sink)
    }
}

impl<R: RandomSource, S: LogSink> Session<R, S> {
    pub fn new(tables: Arc<Tables>, config: GameConfig, rng: R, sink: S) -> Self {
        Self {
            tables,
            config,
            character: None,
            phase: ProgressionPhase::Idle,
            cooldown: 0,
            last_evaluated: None,
            rng,
            sink,
        }
    }

    pub fn character(&self) -> Option<&Character> {
        self.character.as_ref()
    }

    pub fn phase(&self) -> &ProgressionPhase {
        &self.phase
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run one command to completion.
    ///
    /// Rejected commands leave the record untouched and come back as a
    /// danger log entry plus [`Dispatch::error`].
    pub fn dispatch(&mut self, command: Command) -> Dispatch {
        let name = command.name();
        let force = matches!(command, Command::Evaluate);
        let was_alive = self.character.as_ref().is_some_and(|c| !c.is_dead());
        debug!(command = name, "dispatch");

        let mut out = Dispatch::default();
        if let Err(err) = self.apply(command, &mut out) {
            warn!(command = name, %err, "command rejected");
            out.logs.push(LogEntry::from(&err));
            out.error = Some(err);
        }
        self.progress(force, &mut out);

        let dead = self.character.as_ref().is_some_and(Character::is_dead);
        out.died = was_alive && dead;
        if out.died {
            info!(command = name, "character died");
        }
        for entry in &out.logs {
            self.sink.record(entry);
        }
        out
    }

    fn apply(&mut self, command: Command, out: &mut Dispatch) -> Result<(), CoreError> {
        match command {
            Command::NewGame { name, talent } => {
                let ctx = Ctx {
                    tables: &self.tables,
                    config: &self.config,
                    rng: &mut self.rng,
                };
                let (fresh, fx) = character::new_character(&name, talent.as_deref(), &ctx)?;
                out.take_effects(fx);
                self.start(fresh);
                return Ok(());
            }
            Command::Load(loaded) => {
                validate_character(&loaded)?;
                let mut loaded = *loaded;
                let warnings = recompute(&mut loaded, &self.tables);
                out.logs.extend(warnings.iter().map(LogEntry::from));
                out.logs.push(LogEntry::normal(format!(
                    "Welcome back, {}.",
                    loaded.name
                )));
                self.start(loaded);
                return Ok(());
            }
            _ => {}
        }

        let Some(current) = self.character.as_ref() else {
            debug!("no character loaded; ignoring command");
            return Ok(());
        };
        if current.is_dead() && !command.ignores_death() {
            if command.is_progression() || matches!(command, Command::Tick) {
                return Ok(());
            }
            return Err(StateError::CharacterDead.into());
        }

        let step = match &command {
            Command::Evaluate => return Ok(()),
            Command::ConfirmTribulation => Some(confirm(current, &self.phase, &self.tables)?),
            Command::CancelTribulation => Some(cancel(current, &self.phase)?),
            Command::ResolveTribulation(result) => {
                Some(resolve(current, &self.phase, result, &self.tables)?)
            }
            Command::RollTribulation => {
                let ProgressionPhase::TribulationActive(state) = &self.phase else {
                    return Err(StateError::NoActiveTribulation.into());
                };
                let result = state.roll(&mut self.rng, current);
                Some(resolve(current, &self.phase, &result, &self.tables)?)
            }
            _ => None,
        };
        if let Some(mut step) = step {
            out.take_step(&mut step);
            self.phase = step.phase;
            self.character = Some(step.character);
            return Ok(());
        }

        let gated = matches!(
            command,
            Command::UseItem(_) | Command::UseItems(_) | Command::Craft(_)
        );
        if gated && self.cooldown > 0 {
            return Err(StateError::CoolingDown(self.cooldown).into());
        }

        let mut working = current.clone();
        let mut ctx = Ctx {
            tables: &self.tables,
            config: &self.config,
            rng: &mut self.rng,
        };
        let fx = match command {
            Command::GainExperience(amount) => {
                working.gain_experience(amount)?;
                Effects::default()
            }
            Command::Tick => {
                self.cooldown = self.cooldown.saturating_sub(1);
                regen::regenerate(&mut working, ctx.config);
                Effects::default()
            }
            Command::Draw { table, count } => {
                let resolution = draw(&working, &table, count, ctx.tables, &mut *ctx.rng)?;
                info!(table = %table, count, "draw");
                let mut fx = Effects::default();
                fx.absorb(&mut working, resolution);
                fx
            }
            Command::BattleResult(report) => battle::battle_result(&mut working, &report, &mut ctx)?,
            Command::Buy {
                template,
                quantity,
                unit_price,
            } => shop::buy(&mut working, &template, quantity, unit_price, &mut ctx)?,
            Command::Craft(recipe) => shop::craft(&mut working, &recipe, &mut ctx)?,
            Command::Sell { id, quantity } => items::sell(&mut working, id, quantity)?,
            Command::Discard { id, quantity } => items::discard(&mut working, id, quantity)?,
            Command::UseItem(id) => items::use_item(&mut working, id, &mut ctx)?,
            Command::UseItems(ids) => items::use_items(&mut working, &ids, &mut ctx)?,
            Command::Equip { id, slot } => items::equip(&mut working, id, slot, &ctx)?,
            Command::Unequip(slot) => items::unequip(&mut working, slot, &ctx)?,
            Command::RefineNatal(id) => items::refine_natal(&mut working, id, &ctx)?,
            Command::ClearNatal => items::clear_natal(&mut working, &ctx)?,
            Command::AllocateAttribute(attribute) => {
                character::allocate_attribute(&mut working, attribute, &ctx)?
            }
            Command::SelectTitle(title) => character::select_title(&mut working, &title, &ctx)?,
            Command::LearnArt(art) => character::learn_art(&mut working, &art, &ctx)?,
            Command::Revive => character::revive(&mut working)?,
            Command::Rebirth { name } => {
                let name = name.unwrap_or_else(|| working.name.clone());
                let (fresh, fx) = character::new_character(&name, None, &ctx)?;
                out.take_effects(fx);
                out.logs.push(LogEntry::special("You are reborn. Your old path is gone."));
                self.start(fresh);
                return Ok(());
            }
            // Lifecycle and progression commands returned above.
            Command::NewGame { .. }
            | Command::Load(_)
            | Command::Evaluate
            | Command::ConfirmTribulation
            | Command::CancelTribulation
            | Command::ResolveTribulation(_)
            | Command::RollTribulation => return Ok(()),
        };

        if gated {
            self.cooldown = self.config.action_cooldown;
        }
        self.phase = std::mem::take(&mut self.phase).refresh(current, &working);
        self.character = Some(working);
        out.take_effects(fx);
        Ok(())
    }

    fn start(&mut self, character: Character) {
        self.character = Some(character);
        self.phase = ProgressionPhase::Idle;
        self.cooldown = 0;
        self.last_evaluated = None;
    }

    /// Give the breakthrough machine one detection cycle if its inputs moved
    /// since the last one, or unconditionally when `force` is set.
    fn progress(&mut self, force: bool, out: &mut Dispatch) {
        let Some(current) = self.character.as_ref() else {
            return;
        };
        let key = ProgressKey::of(current, &self.phase);
        if !force && self.last_evaluated == Some(key) {
            return;
        }
        let mut step = evaluate(current, &self.phase, &self.tables);
        let broke_through = step.broke_through();
        out.take_step(&mut step);
        self.last_evaluated = if broke_through {
            None
        } else {
            Some(ProgressKey::of(&step.character, &step.phase))
        };
        self.phase = step.phase;
        self.character = Some(step.character);
    }
}
