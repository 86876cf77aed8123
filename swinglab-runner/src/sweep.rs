//! Parameter sweep utilities for grid search.
//!
//! Each configuration runs as an independent simulation over the shared,
//! read-only bar slice. Results come back in grid order, one `Result` per
//! configuration, so one failing configuration never affects the others.

use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use swinglab_core::domain::{Bar, ConfigHash};

use crate::config::BacktestConfig;
use crate::metrics::PerformanceMetrics;
use crate::runner::{run_backtest, BacktestResult, RunError};

/// Parameter grid specification.
///
/// Defines the values to try for each swept parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    /// Trend MA periods to test
    pub trend_ma_periods: Vec<usize>,

    /// Long MA periods to test
    pub long_ma_periods: Vec<usize>,

    /// MACD (fast, slow, signal) triples to test
    pub macd_params: Vec<(usize, usize, usize)>,
}

impl ParamGrid {
    /// A small grid around the monthly swing preset.
    ///
    /// Trend MA: 40, 60, 80
    /// Long MA: 100, 120
    /// MACD: (8, 17, 9), (12, 26, 9)
    pub fn monthly_default() -> Self {
        Self {
            trend_ma_periods: vec![40, 60, 80],
            long_ma_periods: vec![100, 120],
            macd_params: vec![(8, 17, 9), (12, 26, 9)],
        }
    }

    /// Number of raw combinations, before invalid ones are skipped.
    pub fn size(&self) -> usize {
        self.trend_ma_periods.len() * self.long_ma_periods.len() * self.macd_params.len()
    }

    /// Expands the grid against `base`.
    ///
    /// Combinations with trend >= long, or that fail `validate()`, are skipped.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let mut configs = Vec::new();

        for &trend in &self.trend_ma_periods {
            for &long in &self.long_ma_periods {
                if trend >= long {
                    continue;
                }

                for &(fast, slow, signal) in &self.macd_params {
                    let mut config = base.clone();
                    config.strategy.trend_ma_period = trend;
                    config.strategy.long_ma_period = long;
                    config.strategy.macd_fast = fast;
                    config.strategy.macd_slow = slow;
                    config.strategy.macd_signal = signal;

                    if config.validate().is_ok() {
                        configs.push(config);
                    }
                }
            }
        }

        configs
    }
}

/// Metric used to order sweep results. Every metric ranks higher-is-better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingMetric {
    TotalReturn,
    AnnualizedReturn,
    Sharpe,
    /// Smallest drawdown ranks first.
    MaxDrawdown,
    ProfitFactor,
    WinRate,
}

impl RankingMetric {
    /// Score for ranking; `None` when the metric is unavailable for this run.
    pub fn score(self, metrics: &PerformanceMetrics) -> Option<f64> {
        match self {
            RankingMetric::TotalReturn => Some(metrics.total_return),
            RankingMetric::AnnualizedReturn => metrics.annualized_return,
            RankingMetric::Sharpe => metrics.sharpe,
            RankingMetric::MaxDrawdown => Some(-metrics.max_drawdown),
            RankingMetric::ProfitFactor => metrics.profit_factor,
            RankingMetric::WinRate => metrics.win_rate,
        }
    }
}

/// Parameter sweep executor.
///
/// Runs backtests for all configurations in a grid, optionally in parallel.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Executes a parameter sweep over the given grid.
    pub fn sweep(&self, bars: &[Bar], grid: &ParamGrid, base: &BacktestConfig) -> SweepResults {
        self.run_configs(bars, grid.generate_configs(base))
    }

    /// Runs an explicit list of configurations.
    pub fn run_configs(&self, bars: &[Bar], configs: Vec<BacktestConfig>) -> SweepResults {
        info!(configs = configs.len(), bars = bars.len(), parallel = self.parallel, "sweep start");

        let run_one = |config: BacktestConfig| {
            let outcome = run_backtest(bars, &config);
            SweepEntry { config, outcome }
        };

        let entries: Vec<SweepEntry> = if self.parallel {
            configs.into_par_iter().map(run_one).collect()
        } else {
            configs.into_iter().map(run_one).collect()
        };

        let results = SweepResults::new(entries);
        info!(
            succeeded = results.successes().count(),
            failed = results.failures().count(),
            "sweep complete"
        );
        results
    }
}

/// One configuration and what running it produced.
#[derive(Debug, Clone)]
pub struct SweepEntry {
    pub config: BacktestConfig,
    pub outcome: Result<BacktestResult, RunError>,
}

/// Results from a parameter sweep, in grid order.
#[derive(Debug)]
pub struct SweepResults {
    entries: Vec<SweepEntry>,
    by_run_id: HashMap<ConfigHash, usize>,
}

impl SweepResults {
    fn new(entries: Vec<SweepEntry>) -> Self {
        let by_run_id = entries
            .iter()
            .enumerate()
            .filter_map(|(idx, e)| e.outcome.as_ref().ok().map(|r| (r.run_id.clone(), idx)))
            .collect();

        Self { entries, by_run_id }
    }

    pub fn all(&self) -> &[SweepEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &BacktestResult> + '_ {
        self.entries.iter().filter_map(|e| e.outcome.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&BacktestConfig, &RunError)> + '_ {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|err| (&e.config, err)))
    }

    /// Looks up a successful result by its run id.
    pub fn get(&self, run_id: &ConfigHash) -> Option<&BacktestResult> {
        let idx = *self.by_run_id.get(run_id)?;
        self.entries[idx].outcome.as_ref().ok()
    }

    /// Successful results, best first.
    ///
    /// Runs whose metric is unavailable sort last. Ties keep grid order.
    pub fn ranked(&self, metric: RankingMetric) -> Vec<&BacktestResult> {
        let mut ranked: Vec<&BacktestResult> = self.successes().collect();
        ranked.sort_by(|a, b| {
            match (metric.score(&a.metrics), metric.score(&b.metrics)) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
        ranked
    }

    pub fn best(&self, metric: RankingMetric) -> Option<&BacktestResult> {
        self.ranked(metric).into_iter().next()
    }
}
