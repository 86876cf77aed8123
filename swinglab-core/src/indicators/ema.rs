//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = EMA[t-1] + k * (x[t] - EMA[t-1]), k = 2 / (period + 1)
//! Seed: EMA[period-1] = SMA of the first `period` inputs.
//! Lookback: period - 1.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
    k: f64,
    seed_sum: f64,
    seen: usize,
    current: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
            k: 2.0 / (period as f64 + 1.0),
            seed_sum: 0.0,
            seen: 0,
            current: None,
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn update(&mut self, value: f64) -> Option<f64> {
        self.seen += 1;
        self.current = match self.current {
            Some(prev) => Some(prev + self.k * (value - prev)),
            None => {
                self.seed_sum += value;
                (self.seen == self.period).then(|| self.seed_sum / self.period as f64)
            }
        };
        self.current
    }

    fn value(&self) -> Option<f64> {
        self.current
    }
}
