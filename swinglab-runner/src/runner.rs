//! Backtest runner: wires together configuration, engine, and metrics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use swinglab_core::config::ConfigError;
use swinglab_core::domain::{Bar, ConfigHash};
use swinglab_core::engine::{self, EngineError, RunResult};

use crate::config::BacktestConfig;
use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Current schema version for serialized results.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: ConfigHash,
    pub config: BacktestConfig,
    pub metrics: PerformanceMetrics,
    pub run: RunResult,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn trades(&self) -> &[swinglab_core::Trade] {
        &self.run.trades
    }

    /// Equity values in bar order, without timestamps.
    pub fn equity_values(&self) -> Vec<f64> {
        self.run.equity_curve.iter().map(|p| p.equity).collect()
    }
}

/// Run one backtest over pre-loaded bars.
///
/// The config is validated before any bar is touched; bar validation happens
/// inside the engine. Either failure returns no partial result.
pub fn run_backtest(bars: &[Bar], config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let run_id = config.run_id()?;
    let run = engine::run_backtest(bars, &config.strategy, &config.broker)?;
    let metrics = PerformanceMetrics::from_run(&run, config.frequency);
    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        config: config.clone(),
        metrics,
        run,
    })
}
