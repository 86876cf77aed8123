//! Relative Strength Index (RSI) with Wilder smoothing.
//!
//! Seed: plain mean of the first `period` gains and losses (needs period + 1 inputs).
//! Then: avg = (avg_prev * (period - 1) + current) / period.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), and 100 when avg_loss == 0.
//! Lookback: period.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
    prev: Option<f64>,
    changes: usize,
    avg_gain: f64,
    avg_loss: f64,
    current: Option<f64>,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
            prev: None,
            changes: 0,
            avg_gain: 0.0,
            avg_loss: 0.0,
            current: None,
        }
    }

    fn rsi(&self) -> f64 {
        if self.avg_loss == 0.0 {
            return 100.0;
        }
        let rs = self.avg_gain / self.avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, value: f64) -> Option<f64> {
        let prev = self.prev.replace(value)?;
        let change = value - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        self.changes += 1;

        let p = self.period as f64;
        if self.changes <= self.period {
            // Accumulate the seed window, then turn it into a mean.
            self.avg_gain += gain;
            self.avg_loss += loss;
            if self.changes < self.period {
                return None;
            }
            self.avg_gain /= p;
            self.avg_loss /= p;
        } else {
            self.avg_gain = (self.avg_gain * (p - 1.0) + gain) / p;
            self.avg_loss = (self.avg_loss * (p - 1.0) + loss) / p;
        }

        self.current = Some(self.rsi());
        self.current
    }

    fn value(&self) -> Option<f64> {
        self.current
    }
}
