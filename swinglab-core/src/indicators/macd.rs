//! MACD (Moving Average Convergence/Divergence).
//!
//! macd line   = EMA(fast) - EMA(slow)
//! signal line = EMA(signal) of the macd line, seeded with the SMA of its first `signal` values
//! histogram   = macd - signal
//!
//! All three are reported together once the signal line exists, i.e. after
//! `slow + signal - 1` inputs. Lookback: slow + signal - 2.

use super::{Ema, Indicator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    slow_period: usize,
    signal_period: usize,
    current: Option<MacdValue>,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast < slow, "MACD fast period must be < slow period");
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
            slow_period: slow,
            signal_period: signal,
            current: None,
        }
    }

    pub fn lookback(&self) -> usize {
        self.slow_period + self.signal_period - 2
    }

    pub fn update(&mut self, close: f64) -> Option<MacdValue> {
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);
        let (Some(fast), Some(slow)) = (fast, slow) else {
            return None;
        };
        let macd = fast - slow;
        let signal = self.signal.update(macd)?;
        self.current = Some(MacdValue {
            macd,
            signal,
            histogram: macd - signal,
        });
        self.current
    }

    pub fn value(&self) -> Option<MacdValue> {
        self.current
    }
}
