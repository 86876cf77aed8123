//! Serializable backtest configuration.

use serde::{Deserialize, Serialize};
use swinglab_core::config::{fingerprint_of, BrokerConfig, ConfigError, StrategyConfig};
use swinglab_core::domain::{BarFrequency, ConfigHash};

/// Everything needed to reproduce a backtest over a given bar series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub strategy: StrategyConfig,
    pub broker: BrokerConfig,
    /// Sampling interval of the bars; drives annualization.
    pub frequency: BarFrequency,
}

impl BacktestConfig {
    pub fn new(strategy: StrategyConfig, broker: BrokerConfig, frequency: BarFrequency) -> Self {
        Self {
            strategy,
            broker,
            frequency,
        }
    }

    /// Monthly swing preset, strict entry, with the given broker.
    pub fn monthly_strict(broker: BrokerConfig) -> Self {
        Self::new(
            StrategyConfig::monthly_swing_strict(),
            broker,
            BarFrequency::Monthly,
        )
    }

    /// Monthly swing preset, flexible entry, with the given broker.
    pub fn monthly_flexible(broker: BrokerConfig) -> Self {
        Self::new(
            StrategyConfig::monthly_swing_flexible(),
            broker,
            BarFrequency::Monthly,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;
        self.broker.validate()
    }

    /// Content hash of the whole configuration.
    ///
    /// Two runs with identical configs over the same bars produce identical
    /// results, so this identifies a result within a sweep.
    pub fn run_id(&self) -> Result<ConfigHash, ConfigError> {
        fingerprint_of(self)
    }
}
