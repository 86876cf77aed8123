use crate::domain::ids::OrderId;
use crate::domain::order::OrderSide;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Outcome of executing one order against one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillResult {
    pub order_id: OrderId,
    pub side: OrderSide,
    pub size: u64,
    /// Raw bar close the fill was priced from.
    pub price: f64,
    /// Close moved against the trader by the slippage rate.
    pub slippage_adjusted_price: f64,
    pub commission: f64,
    /// `size * slippage_adjusted_price`.
    pub notional: f64,
    /// Extra cost paid to slippage, always >= 0.
    pub slippage_cost: f64,
    pub timestamp: NaiveDateTime,
    pub bar_index: usize,
}

impl FillResult {
    /// Signed cash movement: negative for buys, positive for sells.
    pub fn cash_delta(&self) -> f64 {
        match self.side {
            OrderSide::Buy => -(self.notional + self.commission),
            OrderSide::Sell => self.notional - self.commission,
        }
    }
}
