//! Strategy and broker configuration.
//!
//! - `StrategyConfig`: indicator periods, thresholds, risk and sizing parameters, entry mode.
//! - `BrokerConfig`: starting cash and the cost model rates.
//!
//! Neither type has a `Default`. Callers build them explicitly or start from a
//! named preset, then call `validate()` (the engine also validates before a run).
//! `fingerprint()` gives a content hash for identifying results in a sweep.

use crate::domain::ConfigHash;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contradictory or out-of-range configuration. Detected before any bar is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("min_conditions must be within 1..=3, got {0}")]
    MinConditions(u8),

    #[error("initial_position ({initial}) + add_position ({add}) exceeds max_position ({max})")]
    PositionBudget { initial: f64, add: f64, max: f64 },

    #[error("MACD fast period ({fast}) must be shorter than slow period ({slow})")]
    MacdOrdering { fast: usize, slow: usize },

    #[error("volume_ratio must be > 1.0, got {0}")]
    VolumeRatio(f64),

    #[error("rsi_overbought must be within (0, 100), got {0}")]
    RsiThreshold(f64),

    #[error("{name} must be >= 1")]
    ZeroPeriod { name: &'static str },

    #[error("lot_size must be >= 1")]
    ZeroLotSize,

    #[error("{name} must be within (0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("initial_cash must be finite and > 0, got {0}")]
    NonPositiveCash(f64),

    #[error("{name} must be within [0, 1), got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    #[error("config could not be serialized for fingerprinting: {0}")]
    Serialize(String),
}

/// How many of the three entry conditions must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryMode {
    /// All three conditions.
    Strict,
    /// At least `min_conditions`, and momentum or trend must be among them.
    Flexible { min_conditions: u8 },
}

impl EntryMode {
    pub fn required(self) -> u8 {
        match self {
            EntryMode::Strict => 3,
            EntryMode::Flexible { min_conditions } => min_conditions,
        }
    }
}

/// Parameters of the swing strategy.
///
/// Percentages are fractions (`0.08` means 8%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    // ── Indicators ──
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Medium-term moving average used for trend confirmation.
    pub trend_ma_period: usize,
    /// Long-term moving average; entries wait for it and closes below it stop out.
    pub long_ma_period: usize,
    pub rsi_period: usize,
    pub volume_period: usize,

    // ── Thresholds ──
    pub volume_ratio: f64,
    pub rsi_overbought: f64,

    // ── Risk ──
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub trailing_stop_pct: f64,
    pub pullback_pct: f64,

    // ── Sizing ──
    pub initial_position: f64,
    pub add_position: f64,
    pub max_position: f64,
    pub lot_size: u64,

    pub entry_mode: EntryMode,
}

impl StrategyConfig {
    /// Monthly swing strategy, all three entry conditions required.
    pub fn monthly_swing_strict() -> Self {
        Self {
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            trend_ma_period: 60,
            long_ma_period: 120,
            rsi_period: 14,
            volume_period: 3,
            volume_ratio: 1.3,
            rsi_overbought: 70.0,
            stop_loss_pct: 0.08,
            take_profit_pct: 0.15,
            trailing_stop_pct: 0.05,
            pullback_pct: 0.03,
            initial_position: 0.30,
            add_position: 0.20,
            max_position: 0.50,
            lot_size: 100,
            entry_mode: EntryMode::Strict,
        }
    }

    /// Same parameters with a looser volume surge and two-of-three entries.
    pub fn monthly_swing_flexible() -> Self {
        Self {
            volume_ratio: 1.2,
            entry_mode: EntryMode::Flexible { min_conditions: 2 },
            ..Self::monthly_swing_strict()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("trend_ma_period", self.trend_ma_period),
            ("long_ma_period", self.long_ma_period),
            ("rsi_period", self.rsi_period),
            ("volume_period", self.volume_period),
        ];
        for (name, period) in periods {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod { name });
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::MacdOrdering {
                fast: self.macd_fast,
                slow: self.macd_slow,
            });
        }

        if !(self.volume_ratio.is_finite() && self.volume_ratio > 1.0) {
            return Err(ConfigError::VolumeRatio(self.volume_ratio));
        }
        if !(self.rsi_overbought > 0.0 && self.rsi_overbought < 100.0) {
            return Err(ConfigError::RsiThreshold(self.rsi_overbought));
        }

        let fractions = [
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
            ("trailing_stop_pct", self.trailing_stop_pct),
            ("pullback_pct", self.pullback_pct),
            ("initial_position", self.initial_position),
            ("add_position", self.add_position),
            ("max_position", self.max_position),
        ];
        for (name, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::FractionOutOfRange { name, value });
            }
        }
        if self.initial_position + self.add_position > self.max_position + 1e-12 {
            return Err(ConfigError::PositionBudget {
                initial: self.initial_position,
                add: self.add_position,
                max: self.max_position,
            });
        }
        if self.lot_size == 0 {
            return Err(ConfigError::ZeroLotSize);
        }

        if let EntryMode::Flexible { min_conditions } = self.entry_mode {
            if !(1..=3).contains(&min_conditions) {
                return Err(ConfigError::MinConditions(min_conditions));
            }
        }
        Ok(())
    }

    /// BLAKE3 hash of the canonical JSON encoding.
    pub fn fingerprint(&self) -> Result<ConfigHash, ConfigError> {
        fingerprint_of(self)
    }
}

/// Starting cash and cost model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub initial_cash: f64,
    /// Fraction of notional charged on every fill.
    pub commission_rate: f64,
    /// Fraction the close is moved against the trader on every fill.
    pub slippage_pct: f64,
}

impl BrokerConfig {
    pub fn new(initial_cash: f64, commission_rate: f64, slippage_pct: f64) -> Self {
        Self {
            initial_cash,
            commission_rate,
            slippage_pct,
        }
    }

    /// No commission, no slippage.
    pub fn frictionless(initial_cash: f64) -> Self {
        Self::new(initial_cash, 0.0, 0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_cash.is_finite() && self.initial_cash > 0.0) {
            return Err(ConfigError::NonPositiveCash(self.initial_cash));
        }
        let rates = [
            ("commission_rate", self.commission_rate),
            ("slippage_pct", self.slippage_pct),
        ];
        for (name, value) in rates {
            if !(value >= 0.0 && value < 1.0) {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }
        Ok(())
    }

    pub fn fingerprint(&self) -> Result<ConfigHash, ConfigError> {
        fingerprint_of(self)
    }
}

/// Hash any serializable configuration value.
pub fn fingerprint_of<T: Serialize>(value: &T) -> Result<ConfigHash, ConfigError> {
    let json = serde_json::to_vec(value).map_err(|e| ConfigError::Serialize(e.to_string()))?;
    Ok(ConfigHash::from_bytes(&json))
}
