//! Order sizing in whole lots.
//!
//! Entry targets `equity * initial_position`. An add targets
//! `cash * add / (1 - add)` and is capped so the position stays at or below
//! `max_position` of equity once the fill and its costs are booked.
//! Sizes are truncated toward zero to a multiple of `lot_size`.

use super::cost_model::CostModel;
use crate::config::StrategyConfig;

/// Round a notional down to whole lots at `price`.
pub fn lots_for_notional(notional: f64, price: f64, lot_size: u64) -> u64 {
    if !(notional > 0.0 && price > 0.0) || lot_size == 0 {
        return 0;
    }
    let lots = (notional / price / lot_size as f64).floor();
    if !(lots.is_finite() && lots >= 1.0) {
        return 0;
    }
    // Saturate instead of overflowing; the cash check rejects the order later.
    let max_lots = u64::MAX / lot_size;
    let lots = if lots >= max_lots as f64 { max_lots } else { lots as u64 };
    lots * lot_size
}

/// Shares to buy when opening a position.
pub fn entry_size(equity: f64, close: f64, config: &StrategyConfig) -> u64 {
    lots_for_notional(equity * config.initial_position, close, config.lot_size)
}

/// Shares to add to an open position.
///
/// `position_value` is the current position marked at `close`, and
/// `equity` is cash plus that value.
pub fn add_size(
    cash: f64,
    equity: f64,
    position_value: f64,
    close: f64,
    config: &StrategyConfig,
    cost: &CostModel,
) -> u64 {
    let add = config.add_position;
    let target = cash * add / (1.0 - add);
    let headroom = config.max_position * equity - position_value;
    let mut size = lots_for_notional(target.min(headroom), close, config.lot_size);

    // Buying costs shrink equity, so re-check the cap against post-fill equity.
    let friction_per_share = cost.buy_cost_per_share(close) - close;
    while size > 0 {
        let equity_after = equity - size as f64 * friction_per_share;
        let value_after = position_value + size as f64 * close;
        if value_after <= config.max_position * equity_after {
            break;
        }
        size -= config.lot_size;
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lots_truncate_toward_zero() {
        assert_eq!(lots_for_notional(30_000.0, 12.5, 100), 2_400);
        assert_eq!(lots_for_notional(30_000.0, 13.0, 100), 2_300);
        assert_eq!(lots_for_notional(999.0, 10.0, 100), 0);
        assert_eq!(lots_for_notional(0.0, 10.0, 100), 0);
        assert_eq!(lots_for_notional(-5.0, 10.0, 100), 0);
    }

    #[test]
    fn huge_notional_saturates_instead_of_overflowing() {
        // 1e18 equity * 0.30 at a one-cent close
        let size = lots_for_notional(3e17, 0.01, 100);
        assert_eq!(size % 100, 0);
        assert_eq!(size, (u64::MAX / 100) * 100);
        assert_eq!(lots_for_notional(1e30, 1.0, 1), u64::MAX);

        let cfg = StrategyConfig::monthly_swing_strict();
        assert_eq!(entry_size(1e18, 0.01, &cfg), (u64::MAX / 100) * 100);
    }

    #[test]
    fn entry_is_initial_fraction_of_equity() {
        let cfg = StrategyConfig::monthly_swing_strict();
        // 1,000,000 * 0.30 / 25 = 12,000 shares
        assert_eq!(entry_size(1_000_000.0, 25.0, &cfg), 12_000);
        // 300,000 / 33 = 9090.9 → 9000
        assert_eq!(entry_size(1_000_000.0, 33.0, &cfg), 9_000);
    }

    #[test]
    fn entry_too_small_is_zero() {
        let cfg = StrategyConfig::monthly_swing_strict();
        assert_eq!(entry_size(1_000.0, 50.0, &cfg), 0);
    }

    #[test]
    fn add_uses_remaining_cash_rule() {
        let cfg = StrategyConfig::monthly_swing_strict();
        let cost = CostModel::frictionless();
        // cash 700k → 700k * 0.2 / 0.8 = 175k; headroom 0.5 * 1M - 300k = 200k
        let size = add_size(700_000.0, 1_000_000.0, 300_000.0, 10.0, &cfg, &cost);
        assert_eq!(size, 17_500);
    }

    #[test]
    fn add_is_capped_by_max_fraction() {
        let cfg = StrategyConfig::monthly_swing_strict();
        let cost = CostModel::frictionless();
        // headroom 0.5 * 1M - 450k = 50k
        let size = add_size(550_000.0, 1_000_000.0, 450_000.0, 10.0, &cfg, &cost);
        assert_eq!(size, 5_000);
    }

    #[test]
    fn add_cap_accounts_for_costs() {
        let cfg = StrategyConfig::monthly_swing_strict();
        let cost = CostModel::new(0.001, 0.00025);
        let equity = 1_000_000.0;
        let position_value = 450_000.0;
        let size = add_size(550_000.0, equity, position_value, 10.0, &cfg, &cost);
        let friction = cost.buy_cost_per_share(10.0) - 10.0;
        let after = (position_value + size as f64 * 10.0) / (equity - size as f64 * friction);
        assert!(after <= cfg.max_position);
        assert_eq!(size % cfg.lot_size, 0);
        assert!(size < 5_000);
    }

    #[test]
    fn add_with_no_headroom_is_zero() {
        let cfg = StrategyConfig::monthly_swing_strict();
        let cost = CostModel::frictionless();
        assert_eq!(
            add_size(500_000.0, 1_000_000.0, 500_000.0, 10.0, &cfg, &cost),
            0
        );
    }
}
