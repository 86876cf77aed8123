//! Backtesting engine: bar-by-bar loop and supporting infrastructure.
//!
//! The engine consumes a validated bar sequence and, for each bar, runs
//! ingest → mark → decide → act → account. See `loop_runner` for the phases.

pub mod broker;
pub mod cost_model;
pub mod error;
pub mod events;
pub mod loop_runner;
pub mod position_state;
pub mod sizing;
pub mod state;

pub use broker::{Broker, Execution};
pub use cost_model::CostModel;
pub use error::EngineError;
pub use events::{EngineEvent, EventKind};
pub use loop_runner::{run_backtest, Engine};
pub use position_state::{PositionBook, PositionState};
pub use sizing::{add_size, entry_size, lots_for_notional};
pub use state::RunResult;
