//! Practice session state machine and dialogue orchestration.
//!
//! A `SessionState` is an immutable snapshot. [`transition`] maps a snapshot
//! and an [`Action`] to the next snapshot plus the [`Effect`]s the caller must
//! run. Nothing in this module performs I/O.

mod action;
mod dialogue;
mod state;
mod transition;

pub use action::{Action, Effect, NextScenario};
pub use state::{
    FailedTurnPolicy, RequestKind, RequestTicket, Screen, SessionSettings, SessionState,
};
pub use transition::{transition, Transition};
