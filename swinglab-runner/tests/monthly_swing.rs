//! End-to-end runs of the monthly swing presets over a synthetic series.
//!
//! 130 monthly bars: a slow uptrend from 50 to 78, an eight-month dip to
//! 73.2, then a 3.5% monthly rally. MACD crosses up on bar 123 with the close
//! above both moving averages.

use chrono::{Duration, NaiveDate};
use swinglab_core::domain::{Bar, CloseReason, ExitReason};
use swinglab_core::engine::EventKind;
use swinglab_core::signals::Decision;
use swinglab_core::BrokerConfig;
use swinglab_runner::{run_backtest, BacktestConfig};

const CROSS_BAR: usize = 123;
const INITIAL_CASH: f64 = 1_000_000.0;
const COMMISSION: f64 = 0.0003;
const SLIPPAGE: f64 = 0.001;

fn close_at(i: usize) -> f64 {
    if i <= 112 {
        50.0 + i as f64 * 0.25
    } else if i <= 120 {
        78.0 - (i - 112) as f64 * 0.6
    } else {
        73.2 * 1.035_f64.powi((i - 120) as i32)
    }
}

fn series(volume_spike: bool) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2010, 1, 29)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..130)
        .map(|i| {
            let close = close_at(i);
            let volume = if volume_spike && i == CROSS_BAR {
                3_000.0
            } else {
                1_000.0
            };
            Bar::new(
                start + Duration::days(30 * i as i64),
                close,
                close * 1.01,
                close * 0.99,
                close,
                volume,
            )
        })
        .collect()
}

fn broker() -> BrokerConfig {
    BrokerConfig::new(INITIAL_CASH, COMMISSION, SLIPPAGE)
}

#[test]
fn strict_preset_takes_one_clean_trade() {
    let bars = series(true);
    let result = run_backtest(&bars, &BacktestConfig::monthly_strict(broker())).unwrap();
    let run = &result.run;

    // Exactly one entry decision, on the crossing bar.
    let entries: Vec<_> = run
        .events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::Decision(Decision::Enter { .. })))
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].bar_index, CROSS_BAR);

    // Entry sized at 30% of equity in whole lots of 100.
    let cross_close = bars[CROSS_BAR].close;
    let expected_size = (INITIAL_CASH * 0.30 / cross_close / 100.0).floor() as u64 * 100;
    assert_eq!(expected_size, 3_600);

    assert_eq!(run.trades.len(), 1);
    let trade = &run.trades[0];
    assert_eq!(trade.size, expected_size);
    assert_eq!(trade.entry_bar, CROSS_BAR);
    assert_eq!(trade.exit_bar, 128);
    assert_eq!(trade.bars_held, 5);
    assert!(!trade.added);
    assert!(matches!(
        trade.close_reason,
        CloseReason::Exit(ExitReason::TakeProfit { .. })
    ));

    // Net PnL = price difference minus one commission per leg.
    let entry_fill = cross_close * (1.0 + SLIPPAGE);
    let exit_fill = bars[128].close * (1.0 - SLIPPAGE);
    let size = expected_size as f64;
    let expected_gross = (exit_fill - entry_fill) * size;
    let expected_commission = entry_fill * size * COMMISSION + exit_fill * size * COMMISSION;
    assert!((trade.entry_price - entry_fill).abs() < 1e-9);
    assert!((trade.exit_price - exit_fill).abs() < 1e-9);
    assert!((trade.gross_pnl - expected_gross).abs() < 1e-6);
    assert!((trade.commission - expected_commission).abs() < 1e-6);
    assert!((trade.net_pnl - (expected_gross - expected_commission)).abs() < 1e-6);
    assert!(trade.is_winner());

    // Flat at the end: final equity is cash, which carries the trade's net PnL.
    assert_eq!(run.equity_curve.len(), 130);
    assert!((run.final_equity - (INITIAL_CASH + trade.net_pnl)).abs() < 1e-6);
    assert!((run.final_cash - run.final_equity).abs() < 1e-9);

    let m = &result.metrics;
    assert_eq!(m.trade_count, 1);
    assert_eq!(m.win_count, 1);
    assert_eq!(m.loss_count, 0);
    assert_eq!(m.win_rate, Some(1.0));
    assert_eq!(m.avg_loss, None);
    assert!(m.total_return > 0.05);
    assert!((m.total_commission - expected_commission).abs() < 1e-6);
}

#[test]
fn strict_preset_submits_and_fills_two_orders() {
    let bars = series(true);
    let result = run_backtest(&bars, &BacktestConfig::monthly_strict(broker())).unwrap();
    let run = &result.run;

    assert_eq!(run.events_of("order_submitted").count(), 2);
    assert_eq!(run.events_of("filled").count(), 2);
    assert_eq!(run.events_of("trade_closed").count(), 1);
    assert_eq!(run.rejected_orders(), 0);
    assert_eq!(run.events_of("decision_skipped").count(), 0);

    // Each submission is followed by its fill before anything else happens.
    let labels: Vec<&str> = run.events.iter().map(|e| e.kind.label()).collect();
    for (i, label) in labels.iter().enumerate() {
        if *label == "order_submitted" {
            assert_eq!(labels[i + 1], "filled");
        }
    }
    assert_eq!(labels.last(), Some(&"run_completed"));
}

#[test]
fn no_volume_surge_blocks_strict_entry() {
    let bars = series(false);
    let result = run_backtest(&bars, &BacktestConfig::monthly_strict(broker())).unwrap();
    assert!(result.run.trades.is_empty());
    assert_eq!(result.run.events_of("filled").count(), 0);
    assert_eq!(result.metrics.final_equity, INITIAL_CASH);
    assert_eq!(result.metrics.max_drawdown, 0.0);
}

#[test]
fn flexible_preset_enters_on_two_of_three() {
    let bars = series(false);
    let result = run_backtest(&bars, &BacktestConfig::monthly_flexible(broker())).unwrap();
    let run = &result.run;

    let entry = run
        .events
        .iter()
        .find_map(|e| match e.kind {
            EventKind::Decision(Decision::Enter { conditions }) => Some((e.bar_index, conditions)),
            _ => None,
        })
        .expect("flexible mode should enter");
    assert_eq!(entry.0, CROSS_BAR);
    assert!(entry.1.momentum_cross);
    assert!(entry.1.trend);
    assert!(!entry.1.volume_surge);
    assert_eq!(entry.1.count(), 2);

    assert_eq!(run.trades.len(), 1);
    assert_eq!(run.trades[0].entry_bar, CROSS_BAR);
}

#[test]
fn identical_inputs_give_identical_results() {
    let bars = series(true);
    let cfg = BacktestConfig::monthly_strict(broker());
    let a = run_backtest(&bars, &cfg).unwrap();
    let b = run_backtest(&bars, &cfg).unwrap();
    assert_eq!(a, b);
}
