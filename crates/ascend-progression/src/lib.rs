#![deny(warnings)]

//! Realm progression: threshold detection, breakthrough conditions and the
//! tribulation that gates every realm crossing.
//!
//! The controller is a set of pure reducers over `(Character, ProgressionPhase)`;
//! the caller owns both and decides when a detection cycle runs.

pub mod breakthrough;
pub mod controller;
pub mod phase;
pub mod tribulation;

pub use breakthrough::{apply_breakthrough, check_conditions, BreakthroughOutcome, ConditionError};
pub use controller::{cancel, confirm, evaluate, resolve, ConfirmationRequest, ProgressionEvent, Step};
pub use phase::ProgressionPhase;
pub use tribulation::{TribulationResult, TribulationState};
