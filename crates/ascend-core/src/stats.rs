//! Six-attribute stat block shared by base stats, modifiers and equipment.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Attribute kinds a character can invest points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Attack,
    Defense,
    Hp,
    Spirit,
    Physique,
    Speed,
}

/// Signed stat values. Modifiers may be negative; effective stats are
/// clamped at zero by [`StatBlock::clamped`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub attack: i64,
    pub defense: i64,
    pub max_hp: i64,
    pub spirit: i64,
    pub physique: i64,
    pub speed: i64,
}

impl StatBlock {
    pub const ZERO: StatBlock = StatBlock {
        attack: 0,
        defense: 0,
        max_hp: 0,
        spirit: 0,
        physique: 0,
        speed: 0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Multiply every field by `num / den`, truncating toward zero.
    ///
    /// Integer arithmetic keeps repeated aggregation bit-identical.
    pub fn scaled(&self, num: i64, den: i64) -> StatBlock {
        debug_assert!(den != 0);
        StatBlock {
            attack: self.attack * num / den,
            defense: self.defense * num / den,
            max_hp: self.max_hp * num / den,
            spirit: self.spirit * num / den,
            physique: self.physique * num / den,
            speed: self.speed * num / den,
        }
    }

    /// Floor every field at zero.
    pub fn clamped(&self) -> StatBlock {
        StatBlock {
            attack: self.attack.max(0),
            defense: self.defense.max(0),
            max_hp: self.max_hp.max(0),
            spirit: self.spirit.max(0),
            physique: self.physique.max(0),
            speed: self.speed.max(0),
        }
    }

    /// Non-empty "+N attack, +N defense" fragments for log lines.
    pub fn describe(&self) -> Vec<String> {
        [
            ("attack", self.attack),
            ("defense", self.defense),
            ("max hp", self.max_hp),
            ("spirit", self.spirit),
            ("physique", self.physique),
            ("speed", self.speed),
        ]
        .into_iter()
        .filter(|(_, v)| *v != 0)
        .map(|(name, v)| format!("{v:+} {name}"))
        .collect()
    }
}

impl Add for StatBlock {
    type Output = StatBlock;

    fn add(self, rhs: StatBlock) -> StatBlock {
        StatBlock {
            attack: self.attack + rhs.attack,
            defense: self.defense + rhs.defense,
            max_hp: self.max_hp + rhs.max_hp,
            spirit: self.spirit + rhs.spirit,
            physique: self.physique + rhs.physique,
            speed: self.speed + rhs.speed,
        }
    }
}

impl AddAssign for StatBlock {
    fn add_assign(&mut self, rhs: StatBlock) {
        *self = *self + rhs;
    }
}

impl<'a> std::iter::Sum<&'a StatBlock> for StatBlock {
    fn sum<I: Iterator<Item = &'a StatBlock>>(iter: I) -> StatBlock {
        iter.fold(StatBlock::ZERO, |acc, s| acc + *s)
    }
}
