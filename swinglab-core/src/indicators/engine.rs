//! Indicator engine: owns every indicator of a run and advances them one bar at a time.

use super::{CrossDirection, CrossOver, Indicator, Macd, MacdValue, Rsi, Sma};
use crate::config::StrategyConfig;
use crate::domain::{Bar, DataError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Indicator values as of the close of one bar.
///
/// `None` means the indicator is still warming up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub volume: f64,
    pub trend_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub macd: Option<MacdValue>,
    /// MACD line against its signal line.
    pub macd_cross: Option<CrossDirection>,
    pub rsi: Option<f64>,
    /// Mean volume over `volume_period` bars, current bar included.
    pub volume_avg: Option<f64>,
    /// Bars ingested so far, this one included.
    pub bars_seen: usize,
}

#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    trend_ma: Sma,
    long_ma: Sma,
    macd: Macd,
    macd_cross: CrossOver,
    rsi: Rsi,
    volume_avg: Sma,
    last_timestamp: Option<NaiveDateTime>,
    bars_seen: usize,
}

impl IndicatorEngine {
    /// Build the indicator set for a validated configuration.
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            trend_ma: Sma::new(config.trend_ma_period),
            long_ma: Sma::new(config.long_ma_period),
            macd: Macd::new(config.macd_fast, config.macd_slow, config.macd_signal),
            macd_cross: CrossOver::new(),
            rsi: Rsi::new(config.rsi_period),
            volume_avg: Sma::new(config.volume_period),
            last_timestamp: None,
            bars_seen: 0,
        }
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    /// Advance every indicator by one bar.
    ///
    /// Rejects a bar whose timestamp does not strictly follow the previous one,
    /// leaving the state untouched.
    pub fn ingest(&mut self, bar: &Bar) -> Result<IndicatorSnapshot, DataError> {
        let index = self.bars_seen;
        bar.validate(index)?;
        if let Some(previous) = self.last_timestamp {
            if bar.timestamp <= previous {
                return Err(DataError::NonIncreasingTimestamp {
                    index,
                    previous,
                    current: bar.timestamp,
                });
            }
        }
        self.last_timestamp = Some(bar.timestamp);
        self.bars_seen += 1;

        let trend_ma = self.trend_ma.update(bar.close);
        let long_ma = self.long_ma.update(bar.close);
        let macd = self.macd.update(bar.close);
        let macd_cross = self
            .macd_cross
            .update(macd.map(|m| m.macd), macd.map(|m| m.signal));
        let rsi = self.rsi.update(bar.close);
        let volume_avg = self.volume_avg.update(bar.volume);

        Ok(IndicatorSnapshot {
            bar_index: index,
            timestamp: bar.timestamp,
            close: bar.close,
            volume: bar.volume,
            trend_ma,
            long_ma,
            macd,
            macd_cross,
            rsi,
            volume_avg,
            bars_seen: self.bars_seen,
        })
    }
}
