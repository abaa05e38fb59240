//! The breakthrough state machine as pure reducers.
//!
//! Each entry point takes the current record and phase and returns a
//! [`Step`] holding the next record and phase plus everything the caller
//! should report. Transient states (threshold reached, condition checked,
//! tribulation required) happen inside one call and surface as
//! [`ProgressionEvent`]s.

use tracing::{debug, info};

use ascend_core::{Character, DataIntegrityWarning, LogEntry, Realm, StateError, Tables};

use crate::breakthrough::{apply_breakthrough, check_conditions, next_step, BreakthroughOutcome};
use crate::phase::ProgressionPhase;
use crate::tribulation::{fallback_config, TribulationResult, TribulationState};

/// Question put to the player before a tribulation opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub target: Realm,
    pub tribulation: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressionEvent {
    ThresholdReached,
    PeakCapped,
    ConditionFailed { target: Realm },
    TribulationRequired { target: Realm },
    TribulationOpened { target: Realm },
    TribulationCancelled,
    Breakthrough { realm: Realm, level: u8 },
    TribulationFailed,
    Died,
}

#[derive(Clone, Debug)]
pub struct Step {
    pub character: Character,
    pub phase: ProgressionPhase,
    pub logs: Vec<LogEntry>,
    pub prompt: Option<ConfirmationRequest>,
    pub events: Vec<ProgressionEvent>,
}

impl Step {
    fn unchanged(character: &Character, phase: &ProgressionPhase) -> Self {
        Self {
            character: character.clone(),
            phase: phase.clone(),
            logs: Vec::new(),
            prompt: None,
            events: Vec::new(),
        }
    }

    pub fn broke_through(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, ProgressionEvent::Breakthrough { .. }))
    }

    fn record_breakthrough(&mut self, outcome: &BreakthroughOutcome) {
        let (realm, level) = outcome.to;
        let message = if outcome.crossed_realm() {
            format!("Breakthrough! You have entered the {realm} realm.")
        } else {
            format!("Breakthrough! You reached {realm} level {level}.")
        };
        self.logs.push(LogEntry::special(message));
        if outcome.attribute_points > 0 {
            self.logs.push(LogEntry::gain(format!(
                "Gained {} attribute point(s).",
                outcome.attribute_points
            )));
        }
        self.logs
            .extend(outcome.warnings.iter().map(LogEntry::from));
        self.events.push(ProgressionEvent::Breakthrough { realm, level });
    }
}

fn clamp_experience(character: &mut Character) {
    character.experience = character.experience.min(character.experience_threshold);
}

fn tribulation_name(target: Realm, tables: &Tables) -> String {
    tables
        .tribulation(target)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| format!("{target} Tribulation"))
}

/// One detection cycle. At most one breakthrough happens per call; surplus
/// experience waits for the next cycle.
pub fn evaluate(character: &Character, phase: &ProgressionPhase, tables: &Tables) -> Step {
    let mut step = Step::unchanged(character, phase);
    let c = &mut step.character;
    if c.is_dead() || !c.at_threshold() {
        return step;
    }
    if c.at_peak() {
        if c.experience > c.experience_threshold {
            clamp_experience(c);
            step.events.push(ProgressionEvent::PeakCapped);
        }
        return step;
    }
    match phase {
        ProgressionPhase::AwaitingConfirmation { .. } | ProgressionPhase::TribulationActive(_) => {
            return step;
        }
        ProgressionPhase::Locked if c.experience == c.experience_threshold => {
            debug!("threshold reached while locked; skipping");
            return step;
        }
        _ => {}
    }
    step.phase = ProgressionPhase::Idle;
    step.events.push(ProgressionEvent::ThresholdReached);

    let Some((target, _)) = next_step(c.realm, c.realm_level) else {
        return step;
    };
    let crossing = target != c.realm;
    if crossing {
        if let Err(err) = check_conditions(c, target, tables) {
            clamp_experience(c);
            step.logs
                .push(LogEntry::danger(format!("Breakthrough failed: {err}.")));
            step.events.push(ProgressionEvent::ConditionFailed { target });
            return step;
        }
        if tables.tribulation(target).is_some() {
            let name = tribulation_name(target, tables);
            info!(%target, tribulation = %name, "tribulation required");
            step.prompt = Some(ConfirmationRequest {
                target,
                message: format!("Your {name} has arrived. Face it now?"),
                tribulation: name,
            });
            step.phase = ProgressionPhase::AwaitingConfirmation { target };
            step.events
                .push(ProgressionEvent::TribulationRequired { target });
            return step;
        }
    }

    if let Some(outcome) = apply_breakthrough(&mut step.character, tables, 0) {
        step.record_breakthrough(&outcome);
    }
    step
}

/// Accept the pending tribulation.
pub fn confirm(
    character: &Character,
    phase: &ProgressionPhase,
    tables: &Tables,
) -> Result<Step, StateError> {
    let target = match phase {
        ProgressionPhase::AwaitingConfirmation { target } => *target,
        ProgressionPhase::TribulationActive(_) => return Err(StateError::TribulationAlreadyOpen),
        _ => return Err(StateError::NoPendingConfirmation),
    };
    let mut step = Step::unchanged(character, phase);
    if character.is_dead() {
        return Ok(step);
    }
    let config = match tables.tribulation(target) {
        Some(config) => config.clone(),
        None => {
            let w = DataIntegrityWarning::new(
                "tribulation",
                target.to_string(),
                "using default tribulation",
            );
            step.logs.push(LogEntry::from(&w));
            fallback_config(target)
        }
    };
    let state = TribulationState::open(character, target, &config);
    step.logs.push(LogEntry::special(format!(
        "The {} descends! Chance of survival: {:.0}%.",
        state.name,
        state.success_chance * 100.0
    )));
    step.events.push(ProgressionEvent::TribulationOpened { target });
    step.phase = ProgressionPhase::TribulationActive(state);
    Ok(step)
}

/// Decline the pending tribulation. Experience is clamped to the threshold
/// and the trigger-lock engages. An opened tribulation can only be resolved.
pub fn cancel(character: &Character, phase: &ProgressionPhase) -> Result<Step, StateError> {
    match phase {
        ProgressionPhase::AwaitingConfirmation { .. } => {}
        ProgressionPhase::TribulationActive(_) => return Err(StateError::TribulationAlreadyOpen),
        _ => return Err(StateError::NoPendingConfirmation),
    }
    let mut step = Step::unchanged(character, phase);
    if character.is_dead() {
        return Ok(step);
    }
    clamp_experience(&mut step.character);
    step.phase = ProgressionPhase::Locked;
    step.logs.push(LogEntry::normal(
        "You suppress your cultivation and wait for a better moment.",
    ));
    step.events.push(ProgressionEvent::TribulationCancelled);
    Ok(step)
}

/// Apply an externally decided tribulation outcome.
pub fn resolve(
    character: &Character,
    phase: &ProgressionPhase,
    result: &TribulationResult,
    tables: &Tables,
) -> Result<Step, StateError> {
    if !phase.is_tribulation_open() {
        return Err(StateError::NoActiveTribulation);
    }
    let mut step = Step::unchanged(character, phase);
    if character.is_dead() {
        return Ok(step);
    }
    step.phase = ProgressionPhase::Idle;
    if !result.success {
        step.character.hp = 0;
        info!(realm = %character.realm, "tribulation failed");
        step.logs.push(LogEntry::danger(result.description.clone()));
        step.events.push(ProgressionEvent::TribulationFailed);
        step.events.push(ProgressionEvent::Died);
        return Ok(step);
    }
    let Some(outcome) = apply_breakthrough(&mut step.character, tables, result.hp_loss) else {
        return Ok(step);
    };
    if outcome.hp_lost > 0 {
        step.logs.push(LogEntry::normal(format!(
            "You survived the tribulation but lost {} hp.",
            outcome.hp_lost
        )));
    } else {
        step.logs.push(LogEntry::gain(result.description.clone()));
    }
    step.record_breakthrough(&outcome);
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascend_core::{
        RealmDefinition, Severity, StatBlock, TribulationConfig, UnlockKind, MAX_REALM_LEVEL,
    };

    fn tables() -> Tables {
        let mut t = Tables::default();
        let rows = [
            (Realm::QiRefining, 100, None),
            (Realm::Foundation, 1_000, Some(UnlockKind::FoundationTreasure)),
            (Realm::GoldenCore, 5_000, None),
        ];
        for (realm, base, requires) in rows {
            t.realms.push(RealmDefinition {
                realm,
                base_experience: base,
                experience_step: base / 2,
                gains: StatBlock {
                    attack: 5,
                    max_hp: 50,
                    ..StatBlock::ZERO
                },
                attribute_points: 1,
                requires,
            });
        }
        t.tribulations.insert(
            Realm::Foundation,
            TribulationConfig {
                name: "Foundation Lightning Tribulation".into(),
                base_success: 0.7,
                stat_scale: 100.0,
                max_bonus: 0.2,
                hp_loss_min: 0.1,
                hp_loss_max: 0.3,
            },
        );
        t
    }

    fn at_level(realm: Realm, level: u8, t: &Tables) -> Character {
        let mut c = Character::new("Han Li", t);
        c.realm = realm;
        c.realm_level = level;
        c.experience_threshold = t.threshold(realm, level);
        c.experience = c.experience_threshold;
        c
    }

    fn with_treasure(mut c: Character) -> Character {
        c.unlocks
            .insert(UnlockKind::FoundationTreasure, "Jade Lotus".into());
        c
    }

    #[test]
    fn below_threshold_is_a_no_op() {
        let t = tables();
        let c = Character::new("Han Li", &t);
        let step = evaluate(&c, &ProgressionPhase::Idle, &t);
        assert_eq!(step.character, c);
        assert!(step.events.is_empty());
    }

    #[test]
    fn sub_level_breakthrough_is_direct() {
        let t = tables();
        let mut c = at_level(Realm::QiRefining, 3, &t);
        c.experience += 10;
        let step = evaluate(&c, &ProgressionPhase::Idle, &t);
        assert!(step.prompt.is_none());
        assert_eq!(step.character.realm_level, 4);
        assert_eq!(step.character.experience, 10);
        assert!(step.broke_through());
    }

    #[test]
    fn one_breakthrough_per_cycle() {
        let t = tables();
        let mut c = at_level(Realm::QiRefining, 1, &t);
        c.experience = 10_000;
        let first = evaluate(&c, &ProgressionPhase::Idle, &t);
        assert_eq!(first.character.realm_level, 2);
        assert_eq!(first.character.experience, 9_900);
        let second = evaluate(&first.character, &first.phase, &t);
        assert_eq!(second.character.realm_level, 3);
    }

    #[test]
    fn failed_condition_clamps_and_leaves_lock_unset() {
        let t = tables();
        let mut c = at_level(Realm::QiRefining, MAX_REALM_LEVEL, &t);
        c.experience += 77;
        let step = evaluate(&c, &ProgressionPhase::Idle, &t);
        assert_eq!(step.character.experience, step.character.experience_threshold);
        assert_eq!(step.character.realm, Realm::QiRefining);
        assert_eq!(step.phase, ProgressionPhase::Idle);
        assert!(step.prompt.is_none());
        assert!(step
            .logs
            .iter()
            .any(|l| l.severity == Severity::Danger && l.message.contains("foundation treasure")));
        assert!(step
            .events
            .contains(&ProgressionEvent::ConditionFailed {
                target: Realm::Foundation
            }));
    }

    #[test]
    fn cancelled_tribulation_locks_until_new_gain() {
        let t = tables();
        let mut c = with_treasure(at_level(Realm::QiRefining, MAX_REALM_LEVEL, &t));
        c.experience += 40;
        let asked = evaluate(&c, &ProgressionPhase::Idle, &t);
        let prompt = asked.prompt.clone().unwrap();
        assert_eq!(prompt.target, Realm::Foundation);
        assert!(prompt.message.contains("Foundation Lightning Tribulation"));

        let cancelled = cancel(&asked.character, &asked.phase).unwrap();
        assert!(cancelled.phase.is_locked());
        assert_eq!(
            cancelled.character.experience,
            cancelled.character.experience_threshold
        );

        let again = evaluate(&cancelled.character, &cancelled.phase, &t);
        assert!(again.prompt.is_none());
        assert!(again.events.is_empty());
        assert_eq!(again.character, cancelled.character);
        assert!(again.phase.is_locked());

        let mut gained = cancelled.character.clone();
        gained.experience += 1;
        let phase = cancelled.phase.clone().refresh(&cancelled.character, &gained);
        assert!(evaluate(&gained, &phase, &t).prompt.is_some());
    }

    #[test]
    fn successful_tribulation_applies_loss_in_same_update() {
        let t = tables();
        let c = with_treasure(at_level(Realm::QiRefining, MAX_REALM_LEVEL, &t));
        let asked = evaluate(&c, &ProgressionPhase::Idle, &t);
        let opened = confirm(&asked.character, &asked.phase, &t).unwrap();
        assert!(opened.phase.is_tribulation_open());

        let done = resolve(
            &opened.character,
            &opened.phase,
            &TribulationResult::success(50),
            &t,
        )
        .unwrap();
        assert_eq!(
            (done.character.realm, done.character.realm_level),
            (Realm::Foundation, 1)
        );
        assert_eq!(done.character.hp, c.hp - 50);
        assert_eq!(done.phase, ProgressionPhase::Idle);
        assert!(done.broke_through());
    }

    #[test]
    fn failed_tribulation_kills_without_advancing() {
        let t = tables();
        let c = with_treasure(at_level(Realm::QiRefining, MAX_REALM_LEVEL, &t));
        let asked = evaluate(&c, &ProgressionPhase::Idle, &t);
        let opened = confirm(&asked.character, &asked.phase, &t).unwrap();
        let done = resolve(
            &opened.character,
            &opened.phase,
            &TribulationResult::failure(),
            &t,
        )
        .unwrap();
        assert!(done.character.is_dead());
        assert_eq!(done.character.realm, Realm::QiRefining);
        assert!(done.events.contains(&ProgressionEvent::Died));

        let after = evaluate(&done.character, &done.phase, &t);
        assert!(after.events.is_empty());
    }

    #[test]
    fn reopening_an_open_tribulation_is_a_state_error() {
        let t = tables();
        let c = with_treasure(at_level(Realm::QiRefining, MAX_REALM_LEVEL, &t));
        let asked = evaluate(&c, &ProgressionPhase::Idle, &t);
        let opened = confirm(&asked.character, &asked.phase, &t).unwrap();
        assert_eq!(
            confirm(&opened.character, &opened.phase, &t).unwrap_err(),
            StateError::TribulationAlreadyOpen
        );
        assert_eq!(
            resolve(&c, &ProgressionPhase::Idle, &TribulationResult::success(0), &t).unwrap_err(),
            StateError::NoActiveTribulation
        );
        assert_eq!(
            cancel(&c, &ProgressionPhase::Idle).unwrap_err(),
            StateError::NoPendingConfirmation
        );
    }

    #[test]
    fn opened_tribulation_cannot_be_cancelled() {
        let t = tables();
        let c = with_treasure(at_level(Realm::QiRefining, MAX_REALM_LEVEL, &t));
        let asked = evaluate(&c, &ProgressionPhase::Idle, &t);
        let opened = confirm(&asked.character, &asked.phase, &t).unwrap();
        assert_eq!(
            cancel(&opened.character, &opened.phase).unwrap_err(),
            StateError::TribulationAlreadyOpen
        );
        assert!(opened.phase.is_tribulation_open());
    }

    #[test]
    fn crossing_without_configured_tribulation_is_direct() {
        let t = tables();
        let mut c = at_level(Realm::Foundation, MAX_REALM_LEVEL, &t);
        c.experience += 5;
        let step = evaluate(&c, &ProgressionPhase::Idle, &t);
        assert!(step.prompt.is_none());
        assert_eq!(step.character.realm, Realm::GoldenCore);
        assert_eq!(step.character.experience, 5);
    }

    #[test]
    fn peak_caps_experience() {
        let t = tables();
        let mut c = at_level(Realm::Longevity, MAX_REALM_LEVEL, &t);
        c.experience += 1_000;
        let step = evaluate(&c, &ProgressionPhase::Idle, &t);
        assert_eq!(step.character.experience, step.character.experience_threshold);
        assert_eq!(step.character.realm, Realm::Longevity);
        assert_eq!(step.events, vec![ProgressionEvent::PeakCapped]);
    }

    proptest::proptest! {
        #[test]
        fn cycles_preserve_record_invariants(
            level in 1u8..=MAX_REALM_LEVEL,
            realm_idx in 0usize..Realm::ALL.len(),
            extra in 0u64..50_000,
            hp in 1u64..=100,
            cycles in 1usize..12,
        ) {
            let t = tables();
            let mut c = with_treasure(at_level(Realm::ALL[realm_idx], level, &t));
            c.experience += extra;
            c.hp = hp;
            let mut phase = ProgressionPhase::Idle;
            for _ in 0..cycles {
                let step = evaluate(&c, &phase, &t);
                let breakthroughs = step.events.iter()
                    .filter(|e| matches!(e, ProgressionEvent::Breakthrough { .. }))
                    .count();
                proptest::prop_assert!(breakthroughs <= 1);
                c = step.character;
                phase = step.phase;
                proptest::prop_assert!((1..=MAX_REALM_LEVEL).contains(&c.realm_level));
                proptest::prop_assert!(c.hp <= c.max_hp());
                proptest::prop_assert!(c.hp > 0);
            }
        }
    }

    #[test]
    fn pending_prompt_blocks_reevaluation() {
        let t = tables();
        let c = with_treasure(at_level(Realm::QiRefining, MAX_REALM_LEVEL, &t));
        let asked = evaluate(&c, &ProgressionPhase::Idle, &t);
        let again = evaluate(&asked.character, &asked.phase, &t);
        assert!(again.prompt.is_none());
        assert_eq!(again.phase, asked.phase);
    }
}
