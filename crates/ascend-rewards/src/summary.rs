//! Aggregated, display-ready view of one resolver invocation.

use serde::{Deserialize, Serialize};

use ascend_core::{LogEntry, Rarity, UnlockKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Currency,
    Experience,
    Item,
    Companion,
    Ticket,
    Unlock,
}

/// One merged line: same kind and name accumulate into one quantity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLine {
    pub kind: RewardKind,
    pub name: String,
    pub quantity: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSummary {
    /// Lines in first-seen order.
    pub lines: Vec<RewardLine>,
    /// Highest rarity among the drawn entries, if any draws happened.
    pub best_rarity: Option<Rarity>,
    /// Singleton and longevity rule payoffs paid out as currency because
    /// nothing new could be granted.
    pub converted_singletons: u32,
}

impl RewardSummary {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push(&mut self, kind: RewardKind, name: &str, quantity: u64) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.kind == kind && l.name == name)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }
        self.lines.push(RewardLine {
            kind,
            name: name.to_string(),
            quantity,
        });
    }

    pub fn add_currency(&mut self, amount: u64) {
        self.push(RewardKind::Currency, "spirit stones", amount);
    }

    pub fn add_experience(&mut self, amount: u64) {
        self.push(RewardKind::Experience, "cultivation", amount);
    }

    pub fn add_tickets(&mut self, amount: u64) {
        self.push(RewardKind::Ticket, "draw tickets", amount);
    }

    pub fn add_item(&mut self, name: &str, quantity: u32) {
        self.push(RewardKind::Item, name, u64::from(quantity));
    }

    pub fn add_companion(&mut self, name: &str) {
        self.push(RewardKind::Companion, name, 1);
    }

    pub fn add_unlock(&mut self, kind: UnlockKind, variant: &str) {
        self.push(RewardKind::Unlock, &format!("{kind}: {variant}"), 1);
    }

    pub fn add_longevity_rule(&mut self, rule: &str) {
        self.push(RewardKind::Unlock, &format!("longevity rule: {rule}"), 1);
    }

    pub fn note_rarity(&mut self, rarity: Rarity) {
        self.best_rarity = Some(self.best_rarity.map_or(rarity, |r| r.max(rarity)));
    }

    pub fn quantity_of(&self, kind: RewardKind, name: &str) -> u64 {
        self.lines
            .iter()
            .find(|l| l.kind == kind && l.name == name)
            .map_or(0, |l| l.quantity)
    }

    pub fn currency(&self) -> u64 {
        self.quantity_of(RewardKind::Currency, "spirit stones")
    }

    /// Single log line listing everything gained.
    pub fn to_log(&self) -> Option<LogEntry> {
        if self.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .lines
            .iter()
            .map(|l| match l.kind {
                RewardKind::Companion | RewardKind::Unlock if l.quantity == 1 => l.name.clone(),
                _ => format!("{} x{}", l.name, l.quantity),
            })
            .collect();
        let message = format!("Obtained: {}", parts.join(", "));
        let special = self.lines.iter().any(|l| l.kind == RewardKind::Unlock)
            || self.best_rarity.is_some_and(|r| r >= Rarity::Legendary);
        Some(if special {
            LogEntry::special(message)
        } else {
            LogEntry::gain(message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascend_core::Severity;

    #[test]
    fn same_kind_and_name_merge() {
        let mut s = RewardSummary::default();
        s.add_item("Qi-Gathering Pill", 1);
        s.add_currency(50);
        s.add_item("Qi-Gathering Pill", 2);
        s.add_currency(25);
        assert_eq!(s.lines.len(), 2);
        assert_eq!(s.quantity_of(RewardKind::Item, "Qi-Gathering Pill"), 3);
        assert_eq!(s.currency(), 75);
    }

    #[test]
    fn log_severity_follows_content() {
        let mut s = RewardSummary::default();
        assert!(s.to_log().is_none());
        s.add_currency(10);
        s.note_rarity(Rarity::Rare);
        assert_eq!(s.to_log().unwrap().severity, Severity::Gain);
        s.add_unlock(UnlockKind::FoundationTreasure, "Jade Lotus");
        let log = s.to_log().unwrap();
        assert_eq!(log.severity, Severity::Special);
        assert!(log.message.contains("foundation treasure: Jade Lotus"));
    }
}
