//! Performance metrics: pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in, value out.
//! A statistic whose population is empty (or whose denominator is zero) is
//! reported as `None`, never as a misleading zero.

use serde::{Deserialize, Serialize};
use swinglab_core::domain::{BarFrequency, Trade};
use swinglab_core::engine::RunResult;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    // ── Returns ──
    pub total_return: f64,
    /// Compound annual growth rate.
    pub annualized_return: Option<f64>,
    pub sharpe: Option<f64>,

    // ── Risk ──
    /// Largest peak-to-trough decline as a positive fraction of the peak.
    pub max_drawdown: f64,
    /// Longest run of bars spent below a prior peak.
    pub max_drawdown_duration: usize,

    // ── Trades ──
    pub trade_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    pub win_rate: Option<f64>,
    pub avg_win: Option<f64>,
    /// Mean net PnL of losing trades (zero or negative).
    pub avg_loss: Option<f64>,
    pub profit_factor: Option<f64>,
    pub avg_bars_held: Option<f64>,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,

    // ── Account ──
    pub final_equity: f64,
    pub total_commission: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from an equity series and trade list.
    pub fn compute(
        equity: &[f64],
        trades: &[Trade],
        initial_cash: f64,
        frequency: BarFrequency,
        total_commission: f64,
    ) -> Self {
        let final_equity = equity.last().copied().unwrap_or(initial_cash);
        let periods_per_year = frequency.periods_per_year();
        let (win_count, loss_count) = win_loss_counts(trades);
        Self {
            total_return: total_return(initial_cash, final_equity),
            annualized_return: cagr(initial_cash, final_equity, equity.len(), periods_per_year),
            sharpe: sharpe_ratio(equity, initial_cash, periods_per_year),
            max_drawdown: max_drawdown(equity, initial_cash),
            max_drawdown_duration: max_drawdown_duration(equity, initial_cash),
            trade_count: trades.len(),
            win_count,
            loss_count,
            win_rate: win_rate(trades),
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            profit_factor: profit_factor(trades),
            avg_bars_held: avg_bars_held(trades),
            max_consecutive_wins: max_consecutive(trades, true),
            max_consecutive_losses: max_consecutive(trades, false),
            final_equity,
            total_commission,
        }
    }

    pub fn from_run(run: &RunResult, frequency: BarFrequency) -> Self {
        let equity: Vec<f64> = run.equity_curve.iter().map(|p| p.equity).collect();
        Self::compute(
            &equity,
            &run.trades,
            run.initial_cash,
            frequency,
            run.total_commission,
        )
    }
}

// ─── Return metrics ─────────────────────────────────────────────────

/// Total return as a fraction of the starting cash.
pub fn total_return(initial_cash: f64, final_equity: f64) -> f64 {
    if initial_cash <= 0.0 {
        return 0.0;
    }
    (final_equity - initial_cash) / initial_cash
}

/// Compound annual growth rate over `periods` bars.
///
/// `None` for an empty curve or a non-positive end value.
pub fn cagr(initial_cash: f64, final_equity: f64, periods: usize, periods_per_year: f64) -> Option<f64> {
    if periods == 0 || initial_cash <= 0.0 || final_equity <= 0.0 {
        return None;
    }
    let years = periods as f64 / periods_per_year;
    Some((final_equity / initial_cash).powf(1.0 / years) - 1.0)
}

/// Annualized Sharpe ratio of per-bar returns, zero risk-free rate.
///
/// Sharpe = mean(returns) / sample_std(returns) * sqrt(periods_per_year).
/// The first return is measured from `initial_cash`.
/// `None` with fewer than 2 returns or zero variance.
pub fn sharpe_ratio(equity: &[f64], initial_cash: f64, periods_per_year: f64) -> Option<f64> {
    let returns = period_returns(equity, initial_cash);
    if returns.len() < 2 {
        return None;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return None;
    }
    Some(mean_f64(&returns) / std * periods_per_year.sqrt())
}

// ─── Drawdown ───────────────────────────────────────────────────────

/// Maximum drawdown as a positive fraction (0.15 = 15% below the peak).
///
/// The running peak starts at `initial_cash`, so a loss on the first bar counts.
pub fn max_drawdown(equity: &[f64], initial_cash: f64) -> f64 {
    let mut peak = initial_cash;
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - eq) / peak);
        }
    }
    max_dd
}

/// Longest stretch of consecutive bars with equity below the running peak.
pub fn max_drawdown_duration(equity: &[f64], initial_cash: f64) -> usize {
    let mut peak = initial_cash;
    let mut current = 0;
    let mut longest = 0;
    for &eq in equity {
        if eq >= peak {
            peak = eq;
            current = 0;
        } else {
            current += 1;
            longest = longest.max(current);
        }
    }
    longest
}

// ─── Trade statistics ───────────────────────────────────────────────

/// `(wins, losses)`. A trade with net PnL of exactly zero is a loss.
pub fn win_loss_counts(trades: &[Trade]) -> (usize, usize) {
    let wins = trades.iter().filter(|t| t.is_winner()).count();
    (wins, trades.len() - wins)
}

pub fn win_rate(trades: &[Trade]) -> Option<f64> {
    if trades.is_empty() {
        return None;
    }
    let (wins, _) = win_loss_counts(trades);
    Some(wins as f64 / trades.len() as f64)
}

pub fn avg_win(trades: &[Trade]) -> Option<f64> {
    let wins: Vec<f64> = trades.iter().filter(|t| t.is_winner()).map(|t| t.net_pnl).collect();
    (!wins.is_empty()).then(|| mean_f64(&wins))
}

pub fn avg_loss(trades: &[Trade]) -> Option<f64> {
    let losses: Vec<f64> = trades.iter().filter(|t| !t.is_winner()).map(|t| t.net_pnl).collect();
    (!losses.is_empty()).then(|| mean_f64(&losses))
}

/// Profit factor: gross profits / gross losses.
///
/// `None` without trades. Capped at 100.0 when there are no losing dollars.
pub fn profit_factor(trades: &[Trade]) -> Option<f64> {
    if trades.is_empty() {
        return None;
    }
    let gross_profit: f64 = trades.iter().filter(|t| t.net_pnl > 0.0).map(|t| t.net_pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.net_pnl < 0.0)
        .map(|t| t.net_pnl.abs())
        .sum();
    if gross_loss < 1e-10 {
        return Some(if gross_profit > 0.0 { 100.0 } else { 0.0 });
    }
    Some((gross_profit / gross_loss).min(100.0))
}

pub fn avg_bars_held(trades: &[Trade]) -> Option<f64> {
    if trades.is_empty() {
        return None;
    }
    Some(trades.iter().map(|t| t.bars_held as f64).sum::<f64>() / trades.len() as f64)
}

fn max_consecutive(trades: &[Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;
    for trade in trades {
        if trade.is_winner() == winners {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple returns between consecutive equity points, starting from `initial_cash`.
///
/// One return per equity point.
pub fn period_returns(equity: &[f64], initial_cash: f64) -> Vec<f64> {
    std::iter::once(initial_cash)
        .chain(equity.iter().copied())
        .collect::<Vec<_>>()
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
