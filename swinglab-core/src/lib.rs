//! SwingLab Core: engine, domain types, indicators, signals, broker simulation.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (bars, orders, fills, positions, trades, portfolio)
//! - Streaming indicators (SMA, EMA, MACD, RSI, crossover) behind one `IndicatorEngine`
//! - A pure signal evaluator with fixed StopLoss → Exit → AddPosition → Enter priority
//! - A position/order state machine that allows one order in flight
//! - A broker simulator with slippage and commission
//! - The bar-by-bar loop tying them together, plus resampling of bar series

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signals;

pub use config::{BrokerConfig, ConfigError, EntryMode, StrategyConfig};
pub use domain::{Bar, BarFrequency, DataError, Trade};
pub use engine::{run_backtest, EngineError, RunResult};
