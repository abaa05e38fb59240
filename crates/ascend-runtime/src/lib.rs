#![deny(warnings)]

//! Session runtime: the single owned store, the command set and the
//! handlers behind it.
//!
//! Commands are dispatched one at a time. Each handler works on a copy of
//! the character; the copy replaces the stored record only on success, so a
//! rejected command never leaves a half-applied change behind.

pub mod command;
pub mod handlers;
pub mod session;
pub mod sink;

pub use command::{BattleReport, Command};
pub use session::{Dispatch, Session};
pub use sink::{LogSink, MemorySink, TracingSink};
