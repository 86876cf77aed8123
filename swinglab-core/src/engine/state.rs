//! Run result type.

use super::events::{EngineEvent, EventKind};
use crate::domain::{ConfigHash, EquityPoint, Trade};
use serde::{Deserialize, Serialize};

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub trades: Vec<Trade>,
    /// One point per bar, after that bar's fills.
    pub equity_curve: Vec<EquityPoint>,
    pub events: Vec<EngineEvent>,
    pub initial_cash: f64,
    /// Last point of the equity curve, or the initial cash for an empty run.
    pub final_equity: f64,
    pub final_cash: f64,
    pub total_commission: f64,
    pub total_slippage: f64,
    pub bar_count: usize,
    pub strategy_fingerprint: ConfigHash,
}

impl RunResult {
    /// Events of one kind, by label (e.g. `"filled"`).
    pub fn events_of(&self, label: &str) -> impl Iterator<Item = &EngineEvent> + '_ {
        let label = label.to_owned();
        self.events.iter().filter(move |e| e.kind.label() == label)
    }

    pub fn rejected_orders(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::Rejected { .. }))
            .count()
    }
}
