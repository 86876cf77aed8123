//! Decision: what the strategy wants to do on the current bar.

use crate::domain::{ExitReason, StopReason};
use serde::{Deserialize, Serialize};

/// Which of the three entry conditions held on a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryConditions {
    /// MACD line crossed above its signal line.
    pub momentum_cross: bool,
    /// Close above the medium-term moving average.
    pub trend: bool,
    /// Volume above the rolling average by the configured ratio.
    pub volume_surge: bool,
}

impl EntryConditions {
    pub fn count(&self) -> u8 {
        u8::from(self.momentum_cross) + u8::from(self.trend) + u8::from(self.volume_surge)
    }

    /// Momentum or trend is satisfied. Volume alone never opens a position.
    pub fn has_price_condition(&self) -> bool {
        self.momentum_cross || self.trend
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    None,
    Enter { conditions: EntryConditions },
    /// Price pulled back from entry by `pullback` (a positive fraction).
    AddPosition { pullback: f64 },
    Exit(ExitReason),
    StopLoss(StopReason),
}

impl Decision {
    pub fn is_none(&self) -> bool {
        matches!(self, Decision::None)
    }

    /// Short label for events and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::None => "none",
            Decision::Enter { .. } => "enter",
            Decision::AddPosition { .. } => "add_position",
            Decision::Exit(_) => "exit",
            Decision::StopLoss(_) => "stop_loss",
        }
    }
}
