#![deny(warnings)]

//! Reward resolution: weighted draws with pity, payoff application and
//! aggregated summaries.
//!
//! This crate provides:
//! - Weighted sampling over ordered reward tables, with a deterministic
//!   fallback when every weight is zero
//! - The ten-draw pity guarantee for above-common results
//! - Atomic application of payoffs (currency, experience, items, companions,
//!   tickets and once-per-lifetime unlocks) to a character record

pub mod resolver;
pub mod sampling;
pub mod summary;

pub use resolver::{draw, grant_payoffs, Resolution};
pub use sampling::{draw_batch, pick_index, pity_applies, PITY_INTERVAL};
pub use summary::{RewardKind, RewardLine, RewardSummary};
