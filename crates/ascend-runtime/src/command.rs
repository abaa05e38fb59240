//! Every way the outside world can touch the session.

use ascend_core::{Attribute, Character, EquipmentSlot, ItemId, Payoff};
use ascend_progression::TribulationResult;

/// Result of a battle simulated elsewhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleReport {
    pub victory: bool,
    pub hp_loss: u64,
    /// Signed; the pool floors at zero.
    pub experience: i64,
    pub currency: i64,
    /// Granted only on victory.
    pub drops: Vec<Payoff>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    NewGame {
        name: String,
        talent: Option<String>,
    },
    Load(Box<Character>),
    GainExperience(u64),
    /// Run a detection cycle even if nothing changed.
    Evaluate,
    ConfirmTribulation,
    CancelTribulation,
    ResolveTribulation(TribulationResult),
    /// Resolve the open tribulation with the session's random source.
    RollTribulation,
    /// Periodic regeneration and cooldown decay.
    Tick,
    Draw {
        table: String,
        count: u32,
    },
    BattleResult(BattleReport),
    Buy {
        template: String,
        quantity: u32,
        unit_price: u64,
    },
    Sell {
        id: ItemId,
        quantity: u32,
    },
    Discard {
        id: ItemId,
        quantity: Option<u32>,
    },
    UseItem(ItemId),
    /// Use each listed unit in order; all or nothing.
    UseItems(Vec<ItemId>),
    Equip {
        id: ItemId,
        slot: Option<EquipmentSlot>,
    },
    Unequip(EquipmentSlot),
    RefineNatal(ItemId),
    ClearNatal,
    AllocateAttribute(Attribute),
    SelectTitle(String),
    LearnArt(String),
    Craft(String),
    Revive,
    Rebirth {
        name: Option<String>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::NewGame { .. } => "new_game",
            Command::Load(_) => "load",
            Command::GainExperience(_) => "gain_experience",
            Command::Evaluate => "evaluate",
            Command::ConfirmTribulation => "confirm_tribulation",
            Command::CancelTribulation => "cancel_tribulation",
            Command::ResolveTribulation(_) => "resolve_tribulation",
            Command::RollTribulation => "roll_tribulation",
            Command::Tick => "tick",
            Command::Draw { .. } => "draw",
            Command::BattleResult(_) => "battle_result",
            Command::Buy { .. } => "buy",
            Command::Sell { .. } => "sell",
            Command::Discard { .. } => "discard",
            Command::UseItem(_) => "use_item",
            Command::Equip { .. } => "equip",
            Command::Unequip(_) => "unequip",
            Command::RefineNatal(_) => "refine_natal",
            Command::ClearNatal => "clear_natal",
            Command::AllocateAttribute(_) => "allocate_attribute",
            Command::SelectTitle(_) => "select_title",
            Command::LearnArt(_) => "learn_art",
            Command::Craft(_) => "craft",
            Command::UseItems(_) => "use_items",
            Command::Revive => "revive",
            Command::Rebirth { .. } => "rebirth",
        }
    }

    /// Commands driving the breakthrough machine; no-ops for the dead.
    pub fn is_progression(&self) -> bool {
        matches!(
            self,
            Command::Evaluate
                | Command::ConfirmTribulation
                | Command::CancelTribulation
                | Command::ResolveTribulation(_)
                | Command::RollTribulation
        )
    }

    /// Commands that work whether or not the character lives.
    pub fn ignores_death(&self) -> bool {
        matches!(
            self,
            Command::NewGame { .. } | Command::Load(_) | Command::Revive | Command::Rebirth { .. }
        )
    }
}
