//! Signal evaluation: a pure function of the indicator snapshot, the open
//! position (if any) and the strategy configuration.
//!
//! Rules are checked in fixed priority order, first match wins:
//! StopLoss → Exit → AddPosition → Enter.

use super::decision::{Decision, EntryConditions};
use crate::config::{EntryMode, StrategyConfig};
use crate::domain::{ExitReason, Position, StopReason};
use crate::indicators::{CrossDirection, IndicatorSnapshot};

pub fn evaluate(
    snapshot: &IndicatorSnapshot,
    position: Option<&Position>,
    config: &StrategyConfig,
) -> Decision {
    let Some(position) = position else {
        return match entry_signal(snapshot, config) {
            Some(conditions) => Decision::Enter { conditions },
            None => Decision::None,
        };
    };

    if let Some(reason) = stop_loss_signal(snapshot, position, config) {
        return Decision::StopLoss(reason);
    }
    if let Some(reason) = exit_signal(snapshot, position, config) {
        return Decision::Exit(reason);
    }
    if let Some(pullback) = add_signal(snapshot, position, config) {
        return Decision::AddPosition { pullback };
    }
    Decision::None
}

/// Which entry conditions hold on this bar, regardless of mode.
pub fn entry_conditions(snapshot: &IndicatorSnapshot, config: &StrategyConfig) -> EntryConditions {
    EntryConditions {
        momentum_cross: snapshot.macd_cross == Some(CrossDirection::Up),
        trend: snapshot.trend_ma.is_some_and(|ma| snapshot.close > ma),
        volume_surge: snapshot
            .volume_avg
            .is_some_and(|avg| snapshot.volume > avg * config.volume_ratio),
    }
}

/// Entry while flat. Waits for the long moving average and for more than
/// `volume_period` bars of history.
pub fn entry_signal(snapshot: &IndicatorSnapshot, config: &StrategyConfig) -> Option<EntryConditions> {
    if snapshot.long_ma.is_none() || snapshot.bars_seen <= config.volume_period {
        return None;
    }
    let conditions = entry_conditions(snapshot, config);
    let accepted = match config.entry_mode {
        EntryMode::Strict => conditions.count() == 3,
        EntryMode::Flexible { min_conditions } => {
            conditions.count() >= min_conditions && conditions.has_price_condition()
        }
    };
    accepted.then_some(conditions)
}

pub fn stop_loss_signal(
    snapshot: &IndicatorSnapshot,
    position: &Position,
    config: &StrategyConfig,
) -> Option<StopReason> {
    let loss = -position.unrealized_return(snapshot.close);
    if loss >= config.stop_loss_pct {
        return Some(StopReason::FixedStop { loss });
    }
    match snapshot.long_ma {
        Some(long_ma) if snapshot.close < long_ma => Some(StopReason::BelowLongMa {
            close: snapshot.close,
            long_ma,
        }),
        _ => None,
    }
}

pub fn exit_signal(
    snapshot: &IndicatorSnapshot,
    position: &Position,
    config: &StrategyConfig,
) -> Option<ExitReason> {
    if snapshot.macd_cross == Some(CrossDirection::Down) {
        if let Some(rsi) = snapshot.rsi.filter(|&rsi| rsi > config.rsi_overbought) {
            return Some(ExitReason::MomentumReversal { rsi });
        }
    }
    let drawdown = position.drawdown_from_high(snapshot.close);
    if drawdown >= config.trailing_stop_pct {
        return Some(ExitReason::TrailingStop { drawdown });
    }
    let gain = position.unrealized_return(snapshot.close);
    if gain >= config.take_profit_pct {
        return Some(ExitReason::TakeProfit { gain });
    }
    None
}

/// Pullback to add on, as a positive fraction below the entry price.
pub fn add_signal(
    snapshot: &IndicatorSnapshot,
    position: &Position,
    config: &StrategyConfig,
) -> Option<f64> {
    if position.has_added || position.position_fraction_of_equity >= config.max_position {
        return None;
    }
    let pullback = -position.unrealized_return(snapshot.close);
    if pullback < config.pullback_pct {
        return None;
    }
    if stop_loss_signal(snapshot, position, config).is_some() {
        return None;
    }
    Some(pullback)
}
