//! Simple Moving Average (SMA).
//!
//! Rolling mean over the last `period` values, kept as a window plus running sum.
//! Lookback: period - 1 (first valid value on the period-th input).

use super::Indicator;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
    window: VecDeque<f64>,
    sum: f64,
    current: Option<f64>,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
            current: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn update(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        self.sum += value;
        if self.window.len() > self.period {
            if let Some(leaving) = self.window.pop_front() {
                self.sum -= leaving;
            }
        }
        if self.window.len() == self.period {
            self.current = Some(self.sum / self.period as f64);
        }
        self.current
    }

    fn value(&self) -> Option<f64> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_series, DEFAULT_EPSILON};

    #[test]
    fn sma_basic() {
        let out = compute_series(Sma::new(3), &[10.0, 11.0, 12.0, 13.0, 14.0]);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_approx(out[2].unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(out[3].unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(out[4].unwrap(), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_period_1_is_identity() {
        let closes = [5.0, 10.0, 15.0];
        let out = compute_series(Sma::new(1), &closes);
        for (v, c) in out.iter().zip(closes) {
            assert_approx(v.unwrap(), c, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn sma_value_persists_between_updates() {
        let mut sma = Sma::new(2);
        assert_eq!(sma.value(), None);
        sma.update(4.0);
        sma.update(6.0);
        assert_eq!(sma.value(), Some(5.0));
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).lookback(), 19);
        assert_eq!(Sma::new(20).name(), "sma_20");
    }

    #[test]
    #[should_panic(expected = "SMA period must be >= 1")]
    fn sma_zero_period_panics() {
        Sma::new(0);
    }
}
