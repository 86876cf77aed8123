//! SwingLab Runner: backtest orchestration, performance metrics, parameter sweeps.
//!
//! This crate builds on `swinglab-core` to provide:
//! - `BacktestConfig`, a single serializable bundle of strategy, broker and bar frequency
//! - A single-backtest runner that validates, runs, and computes metrics
//! - Performance metrics over the equity curve and trade log
//! - Parallel parameter sweeps with ranking

pub mod config;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::BacktestConfig;
pub use metrics::PerformanceMetrics;
pub use runner::{run_backtest, BacktestResult, RunError, SCHEMA_VERSION};
pub use sweep::{ParamGrid, ParamSweep, RankingMetric, SweepEntry, SweepResults};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn performance_metrics_is_send_sync() {
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<ParamGrid>();
        assert_sync::<ParamGrid>();
    }

    #[test]
    fn sweep_types_are_send_sync() {
        assert_send::<SweepEntry>();
        assert_sync::<SweepEntry>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<RankingMetric>();
        assert_sync::<RankingMetric>();
    }
}
