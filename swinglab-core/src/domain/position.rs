//! Position: the single open long holding of a run.

use super::fill::FillResult;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An open long position.
///
/// Exists only while `size > 0`; a flat book holds no `Position` at all.
/// `entry_price` is the size-weighted average of the slippage-adjusted buy
/// prices, and `commission_paid` accumulates every buy commission so the
/// closing trade can report net PnL over the whole round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_price: f64,
    pub highest_price_since_entry: f64,
    pub size: u64,
    pub has_added: bool,
    /// Position value over total equity, as of the last fill.
    pub position_fraction_of_equity: f64,
    pub entry_timestamp: NaiveDateTime,
    pub entry_bar: usize,
    pub commission_paid: f64,
}

impl Position {
    /// Open from the first buy fill.
    pub fn open(fill: &FillResult, equity_after_fill: f64) -> Self {
        let mut position = Self {
            entry_price: fill.slippage_adjusted_price,
            highest_price_since_entry: fill.slippage_adjusted_price,
            size: fill.size,
            has_added: false,
            position_fraction_of_equity: 0.0,
            entry_timestamp: fill.timestamp,
            entry_bar: fill.bar_index,
            commission_paid: fill.commission,
        };
        position.refresh_fraction(fill.price, equity_after_fill);
        position
    }

    /// Fold an add-on buy fill into the position.
    pub fn add(&mut self, fill: &FillResult, equity_after_fill: f64) {
        let old_cost = self.entry_price * self.size as f64;
        let add_cost = fill.slippage_adjusted_price * fill.size as f64;
        self.size += fill.size;
        self.entry_price = (old_cost + add_cost) / self.size as f64;
        self.commission_paid += fill.commission;
        self.has_added = true;
        self.refresh_fraction(fill.price, equity_after_fill);
    }

    /// Record a bar close. The highest price never decreases.
    pub fn mark(&mut self, close: f64) {
        if close > self.highest_price_since_entry {
            self.highest_price_since_entry = close;
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.size as f64 * price
    }

    /// Fractional change of `price` relative to the entry price.
    pub fn unrealized_return(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price
    }

    /// Fractional decline of `price` from the highest price seen so far,
    /// with `price` itself counted as a candidate high.
    pub fn drawdown_from_high(&self, price: f64) -> f64 {
        let high = self.highest_price_since_entry.max(price);
        (high - price) / high
    }

    fn refresh_fraction(&mut self, price: f64, equity: f64) {
        self.position_fraction_of_equity = if equity > 0.0 {
            self.market_value(price) / equity
        } else {
            0.0
        };
    }
}
