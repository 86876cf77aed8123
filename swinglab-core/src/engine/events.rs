//! Structured per-bar event log.

use crate::domain::{CloseReason, FillResult, OrderId, OrderPurpose};
use crate::signals::Decision;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEvent {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// The evaluator produced an actionable decision.
    Decision(Decision),
    /// A decision arrived while an order was in flight and was discarded.
    DecisionSkipped { decision: Decision, pending: OrderId },
    /// Sizing rounded to zero lots; nothing was submitted.
    SizingNoOp { decision: Decision },
    OrderSubmitted {
        order_id: OrderId,
        purpose: OrderPurpose,
        size: u64,
    },
    Filled(FillResult),
    Rejected { order_id: OrderId, reason: String },
    TradeClosed {
        trade_index: usize,
        net_pnl: f64,
        reason: CloseReason,
    },
    /// Last event of a run.
    RunCompleted { final_equity: f64 },
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Decision(_) => "decision",
            EventKind::DecisionSkipped { .. } => "decision_skipped",
            EventKind::SizingNoOp { .. } => "sizing_noop",
            EventKind::OrderSubmitted { .. } => "order_submitted",
            EventKind::Filled(_) => "filled",
            EventKind::Rejected { .. } => "rejected",
            EventKind::TradeClosed { .. } => "trade_closed",
            EventKind::RunCompleted { .. } => "run_completed",
        }
    }
}
