//! Signal evaluation.
//!
//! Signals never mutate state. They read the indicator snapshot and the open
//! position, and return a `Decision` for the engine to act on.
//!
//! # Invariants
//! - `evaluate()` is deterministic for the same inputs
//! - at most one decision per bar, chosen by fixed priority

pub mod decision;
pub mod evaluate;

pub use decision::{Decision, EntryConditions};
pub use evaluate::{
    add_signal, entry_conditions, entry_signal, evaluate, exit_signal, stop_loss_signal,
};
