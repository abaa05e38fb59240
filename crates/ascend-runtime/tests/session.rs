use std::sync::Arc;

use ascend_core::{
    validate_character, Character, GameConfig, ItemCategory, ItemTemplate, Payoff, Rarity, Realm,
    RealmDefinition, RewardEntry, RewardTable, ScriptedSource, Severity, StatBlock, StateError,
    Tables, TransientEffect, TribulationConfig, UnlockKind,
};
use ascend_progression::{ProgressionEvent, ProgressionPhase, TribulationResult};
use ascend_runtime::{BattleReport, Command, MemorySink, Session};
use proptest::prelude::*;

fn tables() -> Tables {
    let mut t = Tables::default();
    let rows = [
        (Realm::QiRefining, 100, None),
        (Realm::Foundation, 1_000, Some(UnlockKind::FoundationTreasure)),
        (Realm::GoldenCore, 5_000, Some(UnlockKind::HeavenEarthEssence)),
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
    t.unlocks.insert(
        UnlockKind::FoundationTreasure,
        vec!["Jade Lotus Seat".into()],
    );
    t.items.insert(
        "qi_pill".into(),
        ItemTemplate {
            name: "Qi-Gathering Pill".into(),
            category: ItemCategory::Pill,
            rarity: Rarity::Common,
            effect: TransientEffect {
                heal: 10,
                experience: 5,
            },
            permanent: StatBlock::ZERO,
            bonus: StatBlock::ZERO,
            slot: None,
            sell_price: 4,
            teaches: None,
        },
    );
    t.rewards.insert(
        "lottery".into(),
        RewardTable::new(vec![
            RewardEntry {
                weight: 9,
                rarity: Rarity::Common,
                payoff: Payoff::Currency { amount: 100 },
            },
            RewardEntry {
                weight: 1,
                rarity: Rarity::Legendary,
                payoff: Payoff::SingletonUnlock {
                    unlock: UnlockKind::FoundationTreasure,
                    fallback_currency: 1_000,
                },
            },
        ]),
    );
    t
}

type TestSession = Session<ScriptedSource, MemorySink>;

fn session_with(config: GameConfig) -> TestSession {
    Session::new(
        Arc::new(tables()),
        config,
        ScriptedSource::new(Vec::new()),
        MemorySink::default(),
    )
}

/// A session holding a Qi Refining level-9 cultivator.
fn peak_qi_refining(with_treasure: bool) -> TestSession {
    let mut s = session_with(GameConfig::default());
    let mut c = Character::new("Han Li", s.tables());
    c.realm_level = 9;
    c.experience_threshold = s.tables().threshold(Realm::QiRefining, 9);
    if with_treasure {
        c.unlocks
            .insert(UnlockKind::FoundationTreasure, "Jade Lotus Seat".into());
    }
    let d = s.dispatch(Command::Load(Box::new(c)));
    assert!(d.is_ok());
    s
}

fn character(s: &TestSession) -> &Character {
    s.character().expect("character loaded")
}

#[test]
fn commands_without_a_character_are_ignored() {
    let mut s = session_with(GameConfig::default());
    let d = s.dispatch(Command::GainExperience(50));
    assert!(d.is_ok());
    assert!(d.logs.is_empty());
    assert!(s.character().is_none());
}

#[test]
fn failed_condition_clamps_without_locking() {
    let mut s = peak_qi_refining(false);
    let d = s.dispatch(Command::GainExperience(600));
    assert!(d
        .events
        .contains(&ProgressionEvent::ConditionFailed {
            target: Realm::Foundation
        }));
    let c = character(&s);
    assert_eq!(c.realm, Realm::QiRefining);
    assert_eq!(c.experience, c.experience_threshold);
    assert_eq!(s.phase(), &ProgressionPhase::Idle);
    assert!(d.logs.iter().any(|l| l.severity == Severity::Danger));

    // Nothing moved, so the failure is not re-reported on the next tick.
    let d = s.dispatch(Command::Tick);
    assert!(d.logs.is_empty());
    assert!(d.events.is_empty());
}

#[test]
fn cancel_locks_until_new_experience_then_success_costs_hp() {
    let mut s = peak_qi_refining(true);

    let d = s.dispatch(Command::GainExperience(500));
    let prompt = d.prompt.expect("tribulation prompt");
    assert_eq!(prompt.target, Realm::Foundation);
    assert_eq!(
        s.phase(),
        &ProgressionPhase::AwaitingConfirmation {
            target: Realm::Foundation
        }
    );

    s.dispatch(Command::CancelTribulation);
    assert!(s.phase().is_locked());
    assert_eq!(character(&s).experience, 500);

    let d = s.dispatch(Command::Evaluate);
    assert!(d.prompt.is_none());
    assert!(d.events.is_empty());
    assert!(s.phase().is_locked());

    let d = s.dispatch(Command::GainExperience(10));
    assert!(d.prompt.is_some());

    let d = s.dispatch(Command::ConfirmTribulation);
    assert!(d.is_ok());
    assert!(s.phase().is_tribulation_open());

    let hp_before = character(&s).hp;
    let d = s.dispatch(Command::ResolveTribulation(TribulationResult::success(50)));
    assert!(d.is_ok());
    let c = character(&s);
    assert_eq!((c.realm, c.realm_level), (Realm::Foundation, 1));
    assert_eq!(c.hp, hp_before - 50);
    assert_eq!(c.experience, 10);
    assert_eq!(c.statistics.breakthroughs, 1);
    assert_eq!(s.phase(), &ProgressionPhase::Idle);
    validate_character(c).unwrap();
}

#[test]
fn progression_commands_out_of_turn_are_state_errors() {
    let mut s = peak_qi_refining(true);
    let d = s.dispatch(Command::ConfirmTribulation);
    assert_eq!(d.error, Some(StateError::NoPendingConfirmation.into()));
    let d = s.dispatch(Command::RollTribulation);
    assert_eq!(d.error, Some(StateError::NoActiveTribulation.into()));
    assert_eq!(s.sink().count(Severity::Danger), 2);
}

#[test]
fn confirmed_tribulation_cannot_be_escaped() {
    let mut s = peak_qi_refining(true);
    s.dispatch(Command::GainExperience(500));
    s.dispatch(Command::ConfirmTribulation);
    let before = character(&s).clone();

    let d = s.dispatch(Command::CancelTribulation);
    assert_eq!(d.error, Some(StateError::TribulationAlreadyOpen.into()));
    assert!(s.phase().is_tribulation_open());
    assert_eq!(character(&s), &before);

    let d = s.dispatch(Command::ResolveTribulation(TribulationResult::failure()));
    assert!(d.died);
}

#[test]
fn failed_tribulation_kills_and_dead_characters_are_inert() {
    let mut s = peak_qi_refining(true);
    s.dispatch(Command::GainExperience(500));
    s.dispatch(Command::ConfirmTribulation);
    let d = s.dispatch(Command::ResolveTribulation(TribulationResult::failure()));
    assert!(d.died);
    assert!(d.events.contains(&ProgressionEvent::Died));
    assert!(character(&s).is_dead());

    let d = s.dispatch(Command::Tick);
    assert!(d.is_ok());
    assert!(!d.died);
    assert_eq!(character(&s).hp, 0);

    let d = s.dispatch(Command::Evaluate);
    assert!(d.is_ok() && d.events.is_empty());

    let d = s.dispatch(Command::AllocateAttribute(ascend_core::Attribute::Attack));
    assert_eq!(d.error, Some(StateError::CharacterDead.into()));

    let d = s.dispatch(Command::Revive);
    assert!(d.is_ok());
    assert_eq!(character(&s).hp, character(&s).max_hp());
}

#[test]
fn ten_draws_trigger_pity_and_convert_held_singleton() {
    let mut s = peak_qi_refining(true);
    let mut c = character(&s).clone();
    c.wallet.tickets = 10;
    s.dispatch(Command::Load(Box::new(c)));

    let d = s.dispatch(Command::Draw {
        table: "lottery".into(),
        count: 10,
    });
    assert!(d.is_ok());
    let summary = d.summary.expect("draw summary");
    assert_eq!(summary.converted_singletons, 1);
    assert_eq!(summary.currency(), 1_900);

    let c = character(&s);
    assert_eq!(c.wallet.tickets, 0);
    assert_eq!(c.lifetime_draws, 10);
    assert_eq!(c.wallet.currency, 1_900);
    assert_eq!(
        c.unlocks.get(&UnlockKind::FoundationTreasure).map(String::as_str),
        Some("Jade Lotus Seat")
    );

    let d = s.dispatch(Command::Draw {
        table: "lottery".into(),
        count: 1,
    });
    assert!(d.error.is_some());
    assert_eq!(character(&s).wallet.currency, 1_900);
}

#[test]
fn battle_results_floor_and_kill_counts() {
    let mut s = session_with(GameConfig::default());
    s.dispatch(Command::NewGame {
        name: "Han Li".into(),
        talent: None,
    });
    let d = s.dispatch(Command::BattleResult(BattleReport {
        victory: true,
        hp_loss: 30,
        experience: 40,
        currency: 12,
        drops: vec![Payoff::Item {
            template: "qi_pill".into(),
            quantity: 2,
        }],
    }));
    assert!(d.is_ok());
    let c = character(&s);
    assert_eq!(c.hp, 70);
    assert_eq!(c.statistics.kills, 1);
    assert_eq!(c.inventory.count_named("Qi-Gathering Pill"), 2);

    s.dispatch(Command::BattleResult(BattleReport {
        victory: false,
        hp_loss: 10,
        experience: -1_000,
        currency: -1_000,
        drops: Vec::new(),
    }));
    let c = character(&s);
    assert_eq!((c.experience, c.wallet.currency), (0, 0));
    assert_eq!(c.statistics.kills, 1);
}

#[test]
fn ticks_regenerate_and_cool_down_actions() {
    let mut s = session_with(GameConfig {
        action_cooldown: 2,
        ..GameConfig::default()
    });
    s.dispatch(Command::NewGame {
        name: "Han Li".into(),
        talent: None,
    });
    s.dispatch(Command::BattleResult(BattleReport {
        victory: true,
        hp_loss: 50,
        drops: vec![Payoff::Item {
            template: "qi_pill".into(),
            quantity: 2,
        }],
        ..BattleReport::default()
    }));
    let pill = character(&s)
        .inventory
        .find_by_name("Qi-Gathering Pill")
        .map(|i| i.id)
        .expect("pill granted");

    assert!(s.dispatch(Command::UseItem(pill)).is_ok());
    assert_eq!(character(&s).hp, 60);
    assert_eq!(s.cooldown(), 2);

    let d = s.dispatch(Command::UseItem(pill));
    assert_eq!(d.error, Some(StateError::CoolingDown(2).into()));

    s.dispatch(Command::Tick);
    s.dispatch(Command::Tick);
    assert_eq!(s.cooldown(), 0);
    assert_eq!(character(&s).hp, 62);
    assert!(s.dispatch(Command::UseItem(pill)).is_ok());
    assert_eq!(character(&s).experience, 10);
}

#[test]
fn rejected_commands_leave_the_record_untouched() {
    let mut s = session_with(GameConfig::default());
    s.dispatch(Command::NewGame {
        name: "Han Li".into(),
        talent: None,
    });
    let before = character(&s).clone();
    let d = s.dispatch(Command::Buy {
        template: "qi_pill".into(),
        quantity: 1,
        unit_price: 10,
    });
    assert!(d.error.is_some());
    assert_eq!(character(&s), &before);
    assert!(s.sink().contains("spirit stones"));
}

#[test]
fn batch_use_commits_all_or_nothing() {
    let mut s = session_with(GameConfig::default());
    s.dispatch(Command::NewGame {
        name: "Han Li".into(),
        talent: None,
    });
    s.dispatch(Command::BattleResult(BattleReport {
        victory: true,
        hp_loss: 50,
        drops: vec![Payoff::Item {
            template: "qi_pill".into(),
            quantity: 2,
        }],
        ..BattleReport::default()
    }));
    let pill = character(&s)
        .inventory
        .find_by_name("Qi-Gathering Pill")
        .map(|i| i.id)
        .expect("pill granted");

    let before = character(&s).clone();
    let d = s.dispatch(Command::UseItems(vec![pill, pill, pill]));
    assert!(d.error.is_some());
    assert_eq!(character(&s), &before);

    let d = s.dispatch(Command::UseItems(vec![pill, pill]));
    assert!(d.is_ok());
    let c = character(&s);
    assert_eq!(c.hp, 70);
    assert_eq!(c.experience, 10);
    assert_eq!(c.inventory.count_named("Qi-Gathering Pill"), 0);
    assert_eq!(c.statistics.items_used, 2);
}

#[test]
fn rebirth_resets_everything() {
    let mut s = peak_qi_refining(true);
    s.dispatch(Command::GainExperience(500));
    s.dispatch(Command::Rebirth {
        name: Some("Li Feiyu".into()),
    });
    let c = character(&s);
    assert_eq!(c.name, "Li Feiyu");
    assert_eq!((c.realm, c.realm_level, c.experience), (Realm::QiRefining, 1, 0));
    assert!(c.unlocks.is_empty());
    assert_eq!(s.phase(), &ProgressionPhase::Idle);
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0u64..400).prop_map(Command::GainExperience),
        Just(Command::Evaluate),
        Just(Command::ConfirmTribulation),
        Just(Command::CancelTribulation),
        Just(Command::RollTribulation),
        Just(Command::Tick),
        (1u32..12).prop_map(|count| Command::Draw {
            table: "lottery".into(),
            count,
        }),
        (any::<bool>(), 0u64..80, -50i64..50).prop_map(|(victory, hp_loss, experience)| {
            Command::BattleResult(BattleReport {
                victory,
                hp_loss,
                experience,
                currency: experience,
                drops: Vec::new(),
            })
        }),
        Just(Command::Revive),
    ]
}

proptest! {
    #[test]
    fn any_command_sequence_keeps_the_record_valid(
        commands in prop::collection::vec(command_strategy(), 1..60),
    ) {
        let mut s = Session::seeded(
            Arc::new(tables()),
            GameConfig::default(),
            MemorySink::default(),
        );
        s.dispatch(Command::NewGame { name: "Han Li".into(), talent: None });
        let mut c = s.character().cloned().unwrap();
        c.wallet.tickets = 30;
        s.dispatch(Command::Load(Box::new(c)));
        for command in commands {
            s.dispatch(command);
            let c = s.character().unwrap();
            prop_assert!(validate_character(c).is_ok());
            prop_assert!(c.hp <= c.max_hp());
            if s.phase().is_locked() {
                prop_assert!(c.experience <= c.experience_threshold);
            }
        }
    }
}
