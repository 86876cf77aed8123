//! Portfolio: cash ledger and equity curve.

use super::fill::FillResult;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One point of the equity curve, recorded after the bar's fills.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// Cash and accumulated costs for a run.
///
/// Position value is supplied by the caller, so the accounting identity
/// `equity == cash + size * close` is evaluated in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_cash: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub total_commission: f64,
    pub total_slippage: f64,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            initial_cash,
            equity_curve: Vec::new(),
            total_commission: 0.0,
            total_slippage: 0.0,
        }
    }

    pub fn equity(&self, position_value: f64) -> f64 {
        self.cash + position_value
    }

    /// Book a fill's cash movement and costs.
    pub fn apply_fill(&mut self, fill: &FillResult) {
        self.cash += fill.cash_delta();
        self.total_commission += fill.commission;
        self.total_slippage += fill.slippage_cost;
    }

    /// Append one equity point. Called exactly once per bar.
    pub fn record_equity(&mut self, timestamp: NaiveDateTime, position_value: f64) -> f64 {
        let equity = self.equity(position_value);
        self.equity_curve.push(EquityPoint { timestamp, equity });
        equity
    }

    pub fn last_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map_or(self.initial_cash, |p| p.equity)
    }
}
