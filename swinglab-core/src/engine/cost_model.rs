//! Cost model: slippage and commission calculation.
//!
//! Slippage is directional: buyers pay more (higher price), sellers receive less (lower price).
//! Commission is a fraction of the slippage-adjusted notional, charged on both legs.

use crate::config::BrokerConfig;
use crate::domain::OrderSide;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    /// Fraction the fill price moves against the trader.
    pub slippage_pct: f64,
    /// Fraction of notional charged per fill.
    pub commission_rate: f64,
}

impl CostModel {
    pub fn new(slippage_pct: f64, commission_rate: f64) -> Self {
        Self {
            slippage_pct,
            commission_rate,
        }
    }

    pub fn from_broker(config: &BrokerConfig) -> Self {
        Self::new(config.slippage_pct, config.commission_rate)
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Apply slippage to a raw fill price.
    ///
    /// Returns `(slipped_price, slippage_amount)` where the amount is the extra
    /// cost over `quantity` shares and is never negative.
    pub fn apply_slippage(&self, raw_price: f64, side: OrderSide, quantity: u64) -> (f64, f64) {
        if self.slippage_pct == 0.0 {
            return (raw_price, 0.0);
        }
        let slipped = raw_price * (1.0 + side.sign() * self.slippage_pct);
        let amount = (slipped - raw_price).abs() * quantity as f64;
        (slipped, amount)
    }

    /// `commission = fill_price * quantity * commission_rate`
    pub fn compute_commission(&self, fill_price: f64, quantity: u64) -> f64 {
        fill_price * quantity as f64 * self.commission_rate
    }

    /// Cash needed to buy one share at `raw_price`, costs included.
    pub fn buy_cost_per_share(&self, raw_price: f64) -> f64 {
        raw_price * (1.0 + self.slippage_pct) * (1.0 + self.commission_rate)
    }
}
