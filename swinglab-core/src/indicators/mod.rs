//! Streaming indicator implementations.
//!
//! Every indicator consumes one value per bar through `update` and reports
//! `None` while it is warming up. State lives inside the indicator, so each
//! simulation run owns its own instances and replays are reproducible.
//!
//! MACD produces three lines and the crossover detector compares two series,
//! so those two expose their own `update` signatures instead of the
//! single-series `Indicator` trait.

pub mod crossover;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use crossover::{CrossDirection, CrossOver};
pub use ema::Ema;
pub use engine::{IndicatorEngine, IndicatorSnapshot};
pub use macd::{Macd, MacdValue};
pub use rsi::Rsi;
pub use sma::Sma;

/// A single-series streaming indicator.
pub trait Indicator: Send + Sync {
    /// Stable identifier, e.g. `"sma_20"`.
    fn name(&self) -> &str;

    /// Index of the first defined output: `lookback()` inputs must be seen
    /// before the one that produces the first value.
    fn lookback(&self) -> usize;

    /// Feed the next value and return the updated output.
    fn update(&mut self, value: f64) -> Option<f64>;

    /// Most recent output without consuming input.
    fn value(&self) -> Option<f64>;
}

/// Run an indicator over a whole series from a fresh state.
pub fn compute_series<I: Indicator>(mut indicator: I, values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|&v| indicator.update(v)).collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
