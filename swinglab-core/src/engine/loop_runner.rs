//! Bar-by-bar event loop: the heart of the backtesting engine.
//!
//! Phases per bar, strictly sequential:
//! 1. Ingest: advance the indicators (rejects out-of-order or malformed bars)
//! 2. Mark: raise the open position's highest price to the close if needed
//! 3. Decide: evaluate StopLoss → Exit → AddPosition → Enter
//! 4. Act: size the order, submit it, fill or reject it at the close
//! 5. Account: append cash + position value to the equity curve
//!
//! A run never looks ahead: everything on bar T uses bars 0..=T only.

use super::broker::{Broker, Execution};
use super::error::EngineError;
use super::events::{EngineEvent, EventKind};
use super::position_state::PositionBook;
use super::sizing::{add_size, entry_size};
use super::state::RunResult;
use crate::config::{BrokerConfig, StrategyConfig};
use crate::domain::{
    validate_bars, Bar, CloseReason, ConfigHash, IdGen, Order, OrderError, OrderPurpose, Trade,
};
use crate::indicators::{IndicatorEngine, IndicatorSnapshot};
use crate::signals::{evaluate, Decision};
use tracing::{debug, info, info_span};

/// Run a complete backtest over `bars`.
///
/// Both configurations and the whole bar sequence are validated before the
/// first bar is processed, so a failure never yields partial results.
pub fn run_backtest(
    bars: &[Bar],
    strategy: &StrategyConfig,
    broker: &BrokerConfig,
) -> Result<RunResult, EngineError> {
    let mut engine = Engine::new(strategy, broker)?;
    validate_bars(bars)?;

    let _span = info_span!(
        "run_backtest",
        bars = bars.len(),
        config = %engine.fingerprint.short()
    )
    .entered();

    for bar in bars {
        engine.on_bar(bar)?;
    }
    Ok(engine.finish())
}

/// Incremental engine: feed bars one at a time, then call `finish`.
#[derive(Debug, Clone)]
pub struct Engine {
    strategy: StrategyConfig,
    indicators: IndicatorEngine,
    book: PositionBook,
    broker: Broker,
    ids: IdGen,
    trades: Vec<Trade>,
    events: Vec<EngineEvent>,
    fingerprint: ConfigHash,
    last_timestamp: Option<chrono::NaiveDateTime>,
}

impl Engine {
    pub fn new(strategy: &StrategyConfig, broker: &BrokerConfig) -> Result<Self, EngineError> {
        strategy.validate()?;
        broker.validate()?;
        Ok(Self {
            strategy: strategy.clone(),
            indicators: IndicatorEngine::new(strategy),
            book: PositionBook::new(),
            broker: Broker::new(broker),
            ids: IdGen::default(),
            trades: Vec::new(),
            events: Vec::new(),
            fingerprint: strategy.fingerprint()?,
            last_timestamp: None,
        })
    }

    pub fn book(&self) -> &PositionBook {
        &self.book
    }

    pub fn broker(&self) -> &Broker {
        &self.broker
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Process one bar through every phase. Returns the bar's recorded equity.
    pub fn on_bar(&mut self, bar: &Bar) -> Result<f64, EngineError> {
        let snapshot = self.indicators.ingest(bar)?;
        let index = snapshot.bar_index;
        self.last_timestamp = Some(bar.timestamp);

        self.book.mark(bar.close);

        let decision = evaluate(&snapshot, self.book.position(), &self.strategy);
        if !decision.is_none() {
            if let Some(pending) = self.book.in_flight() {
                let pending = pending.id;
                debug!(bar_index = index, decision = decision.label(), %pending, "decision skipped");
                self.push(bar, EventKind::DecisionSkipped { decision, pending });
            } else {
                debug!(bar_index = index, decision = decision.label(), close = bar.close, "decision");
                self.push(bar, EventKind::Decision(decision));
                self.act(decision, &snapshot, bar)?;
            }
        }

        let position_value = self.book.position_value(bar.close);
        let equity = self.broker.record_equity(bar.timestamp, position_value);
        debug_assert!(self.broker.cash() >= -1e-6, "cash went negative");
        debug_assert!(self.book.in_flight().is_none(), "order left in flight at bar end");
        Ok(equity)
    }

    /// Close out the run and hand back its results.
    pub fn finish(mut self) -> RunResult {
        let final_equity = self.broker.portfolio().last_equity();
        if let Some(timestamp) = self.last_timestamp {
            self.events.push(EngineEvent {
                bar_index: self.indicators.bars_seen().saturating_sub(1),
                timestamp,
                kind: EventKind::RunCompleted { final_equity },
            });
        }
        let portfolio = self.broker.into_portfolio();
        info!(
            bars = self.indicators.bars_seen(),
            trades = self.trades.len(),
            final_equity,
            total_return = (final_equity - portfolio.initial_cash) / portfolio.initial_cash,
            "run complete"
        );
        RunResult {
            trades: self.trades,
            equity_curve: portfolio.equity_curve,
            events: self.events,
            initial_cash: portfolio.initial_cash,
            final_equity,
            final_cash: portfolio.cash,
            total_commission: portfolio.total_commission,
            total_slippage: portfolio.total_slippage,
            bar_count: self.indicators.bars_seen(),
            strategy_fingerprint: self.fingerprint,
        }
    }

    fn act(
        &mut self,
        decision: Decision,
        snapshot: &IndicatorSnapshot,
        bar: &Bar,
    ) -> Result<(), EngineError> {
        match decision {
            Decision::None => Ok(()),
            Decision::Enter { .. } => {
                let equity = self.broker.equity(0.0);
                let size = entry_size(equity, bar.close, &self.strategy);
                self.submit_buy(OrderPurpose::Enter, size, decision, snapshot, bar)
            }
            Decision::AddPosition { .. } => {
                let position_value = self.book.position_value(bar.close);
                let cash = self.broker.cash();
                let size = add_size(
                    cash,
                    cash + position_value,
                    position_value,
                    bar.close,
                    &self.strategy,
                    self.broker.cost_model(),
                );
                self.submit_buy(OrderPurpose::AddPosition, size, decision, snapshot, bar)
            }
            Decision::Exit(reason) => self.submit_close(CloseReason::Exit(reason), snapshot, bar),
            Decision::StopLoss(reason) => {
                self.submit_close(CloseReason::StopLoss(reason), snapshot, bar)
            }
        }
    }

    fn submit_buy(
        &mut self,
        purpose: OrderPurpose,
        size: u64,
        decision: Decision,
        snapshot: &IndicatorSnapshot,
        bar: &Bar,
    ) -> Result<(), EngineError> {
        if size == 0 {
            debug!(bar_index = snapshot.bar_index, decision = decision.label(), "sizing no-op");
            self.push(bar, EventKind::SizingNoOp { decision });
            return Ok(());
        }
        let order = Order::new(self.ids.next_order_id(), purpose, size, snapshot.bar_index)?;
        self.push_submitted(&order, bar);
        self.book.submit(order)?;
        self.settle(bar, snapshot.bar_index)
    }

    fn submit_close(
        &mut self,
        reason: CloseReason,
        snapshot: &IndicatorSnapshot,
        bar: &Bar,
    ) -> Result<(), EngineError> {
        let size = self
            .book
            .position()
            .map(|p| p.size)
            .ok_or(OrderError::UnexpectedOrder {
                purpose: OrderPurpose::Close,
                state: self.book.state().label(),
            })?;
        let order = Order::new(
            self.ids.next_order_id(),
            OrderPurpose::Close,
            size,
            snapshot.bar_index,
        )?;
        self.push_submitted(&order, bar);
        self.book.submit_close(order, reason)?;
        self.settle(bar, snapshot.bar_index)
    }

    /// Fill or reject the in-flight order at this bar's close.
    fn settle(&mut self, bar: &Bar, bar_index: usize) -> Result<(), EngineError> {
        let order = self.book.in_flight_mut().ok_or(OrderError::NothingInFlight)?;
        let order_id = order.id;
        match self.broker.execute(order, bar, bar_index)? {
            Execution::Filled(fill) => {
                let trade = self.book.on_fill(&fill, self.broker.cash())?;
                self.push(bar, EventKind::Filled(fill));
                if let Some(trade) = trade {
                    info!(
                        entry_bar = trade.entry_bar,
                        exit_bar = trade.exit_bar,
                        size = trade.size,
                        net_pnl = trade.net_pnl,
                        return_pct = trade.return_pct,
                        reason = ?trade.close_reason,
                        "trade closed"
                    );
                    self.push(
                        bar,
                        EventKind::TradeClosed {
                            trade_index: self.trades.len(),
                            net_pnl: trade.net_pnl,
                            reason: trade.close_reason,
                        },
                    );
                    self.trades.push(trade);
                }
            }
            Execution::Rejected { reason } => {
                self.book.on_reject(order_id)?;
                self.push(bar, EventKind::Rejected { order_id, reason });
            }
        }
        Ok(())
    }

    fn push_submitted(&mut self, order: &Order, bar: &Bar) {
        self.push(
            bar,
            EventKind::OrderSubmitted {
                order_id: order.id,
                purpose: order.purpose,
                size: order.requested_size,
            },
        );
    }

    fn push(&mut self, bar: &Bar, kind: EventKind) {
        self.events.push(EngineEvent {
            bar_index: self.indicators.bars_seen().saturating_sub(1),
            timestamp: bar.timestamp,
            kind,
        });
    }
}
