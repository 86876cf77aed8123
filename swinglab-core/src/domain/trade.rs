//! Trade: a completed round trip, plus the typed reasons a position is closed.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Why a profitable or neutral position was exited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExitReason {
    /// MACD crossed down while RSI was above the overbought level.
    MomentumReversal { rsi: f64 },
    /// Close fell from the highest price since entry by at least the trailing percentage.
    TrailingStop { drawdown: f64 },
    /// Unrealized gain reached the take-profit percentage.
    TakeProfit { gain: f64 },
}

/// Why a position was stopped out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StopReason {
    /// Unrealized loss reached the stop-loss percentage. `loss` is positive.
    FixedStop { loss: f64 },
    /// Close fell below the long-term moving average.
    BelowLongMa { close: f64, long_ma: f64 },
}

/// Reason recorded on a closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CloseReason {
    Exit(ExitReason),
    StopLoss(StopReason),
}

/// A complete round-trip trade record: entry → exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ──
    pub entry_bar: usize,
    pub entry_timestamp: NaiveDateTime,
    /// Size-weighted average of the slippage-adjusted buy prices.
    pub entry_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_timestamp: NaiveDateTime,
    pub exit_price: f64,

    // ── Size ──
    pub size: u64,
    /// Whether the position was added to before it closed.
    pub added: bool,

    // ── PnL ──
    pub gross_pnl: f64,
    /// Sum of every commission paid on the round trip (all buys plus the sell).
    pub commission: f64,
    pub net_pnl: f64,
    pub return_pct: f64,

    // ── Duration ──
    pub bars_held: usize,

    pub close_reason: CloseReason,
}

impl Trade {
    /// A trade is a winner only if it made money after costs.
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }
}
