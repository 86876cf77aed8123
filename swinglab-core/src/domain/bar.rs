//! Bar: the fundamental market data unit, plus input-sequence validation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for one fixed interval (a trading day, week or month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Malformed or out-of-order input. Fatal to a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("bar {index} ({timestamp}): {field} must be finite and > 0, got {value}")]
    NonPositivePrice {
        index: usize,
        timestamp: NaiveDateTime,
        field: &'static str,
        value: f64,
    },

    #[error("bar {index} ({timestamp}): volume must be finite and > 0, got {value}")]
    NonPositiveVolume {
        index: usize,
        timestamp: NaiveDateTime,
        value: f64,
    },

    #[error("bar {index}: timestamp {current} does not follow {previous}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
}

impl Bar {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check a single bar's fields. `index` is only used for the error message.
    pub fn validate(&self, index: usize) -> Result<(), DataError> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (field, value) in prices {
            if !(value.is_finite() && value > 0.0) {
                return Err(DataError::NonPositivePrice {
                    index,
                    timestamp: self.timestamp,
                    field,
                    value,
                });
            }
        }
        if !(self.volume.is_finite() && self.volume > 0.0) {
            return Err(DataError::NonPositiveVolume {
                index,
                timestamp: self.timestamp,
                value: self.volume,
            });
        }
        Ok(())
    }
}

/// Validate a whole bar sequence before a run starts.
///
/// Reports the first violation: a non-positive/non-finite price or volume, or a
/// timestamp that does not strictly increase. An empty sequence is valid.
pub fn validate_bars(bars: &[Bar]) -> Result<(), DataError> {
    for (index, bar) in bars.iter().enumerate() {
        bar.validate(index)?;
        if index > 0 {
            let previous = bars[index - 1].timestamp;
            if bar.timestamp <= previous {
                return Err(DataError::NonIncreasingTimestamp {
                    index,
                    previous,
                    current: bar.timestamp,
                });
            }
        }
    }
    Ok(())
}
