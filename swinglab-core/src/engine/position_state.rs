//! Position and order state machine.
//!
//! ```text
//! Flat ──submit(Enter)──▶ Entering ──fill──▶ Open
//! Open ──submit(Add)────▶ Adding   ──fill──▶ Open
//! Open ──submit_close───▶ Exiting  ──fill──▶ Flat   (emits a Trade)
//! Entering/Adding/Exiting ──reject──▶ previous state
//! ```
//!
//! The in-flight order lives inside the state variant, so a second order
//! cannot exist alongside it. Submitting while one is in flight is an error.

use crate::domain::{CloseReason, FillResult, Order, OrderError, OrderId, OrderPurpose, Position, Trade};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum PositionState {
    #[default]
    Flat,
    Entering {
        order: Order,
    },
    Open {
        position: Position,
    },
    Adding {
        position: Position,
        order: Order,
    },
    Exiting {
        position: Position,
        order: Order,
        reason: CloseReason,
    },
}

impl PositionState {
    pub fn label(&self) -> &'static str {
        match self {
            PositionState::Flat => "flat",
            PositionState::Entering { .. } => "entering",
            PositionState::Open { .. } => "open",
            PositionState::Adding { .. } => "adding",
            PositionState::Exiting { .. } => "exiting",
        }
    }
}

/// Owns the position and the single in-flight order of a run.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    state: PositionState,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.state, PositionState::Flat)
    }

    /// The open position, including while an add or exit order is in flight.
    pub fn position(&self) -> Option<&Position> {
        match &self.state {
            PositionState::Open { position }
            | PositionState::Adding { position, .. }
            | PositionState::Exiting { position, .. } => Some(position),
            PositionState::Flat | PositionState::Entering { .. } => None,
        }
    }

    pub fn in_flight(&self) -> Option<&Order> {
        match &self.state {
            PositionState::Entering { order }
            | PositionState::Adding { order, .. }
            | PositionState::Exiting { order, .. } => Some(order),
            PositionState::Flat | PositionState::Open { .. } => None,
        }
    }

    pub fn in_flight_mut(&mut self) -> Option<&mut Order> {
        match &mut self.state {
            PositionState::Entering { order }
            | PositionState::Adding { order, .. }
            | PositionState::Exiting { order, .. } => Some(order),
            PositionState::Flat | PositionState::Open { .. } => None,
        }
    }

    /// Market value of the position at `price`, zero when flat.
    pub fn position_value(&self, price: f64) -> f64 {
        self.position().map_or(0.0, |p| p.market_value(price))
    }

    /// Record a bar close on the open position.
    pub fn mark(&mut self, close: f64) {
        match &mut self.state {
            PositionState::Open { position }
            | PositionState::Adding { position, .. }
            | PositionState::Exiting { position, .. } => position.mark(close),
            PositionState::Flat | PositionState::Entering { .. } => {}
        }
    }

    /// Submit an entry or add-on buy order.
    pub fn submit(&mut self, order: Order) -> Result<(), OrderError> {
        self.ensure_idle()?;
        let state = std::mem::take(&mut self.state);
        self.state = match (state, order.purpose) {
            (PositionState::Flat, OrderPurpose::Enter) => PositionState::Entering { order },
            (PositionState::Open { position }, OrderPurpose::AddPosition) => {
                PositionState::Adding { position, order }
            }
            (state, purpose) => {
                let label = state.label();
                self.state = state;
                return Err(OrderError::UnexpectedOrder {
                    purpose,
                    state: label,
                });
            }
        };
        Ok(())
    }

    /// Submit the order that sells the whole position.
    pub fn submit_close(&mut self, order: Order, reason: CloseReason) -> Result<(), OrderError> {
        self.ensure_idle()?;
        let state = std::mem::take(&mut self.state);
        match state {
            PositionState::Open { position }
                if order.purpose == OrderPurpose::Close && order.requested_size == position.size =>
            {
                self.state = PositionState::Exiting {
                    position,
                    order,
                    reason,
                };
                Ok(())
            }
            state => {
                let label = state.label();
                self.state = state;
                Err(OrderError::UnexpectedOrder {
                    purpose: order.purpose,
                    state: label,
                })
            }
        }
    }

    /// Apply the fill of the in-flight order.
    ///
    /// `cash_after_fill` is the broker's cash once the fill has been booked;
    /// it is used to compute the position's share of equity. Returns the
    /// completed trade when the fill closes the position.
    pub fn on_fill(
        &mut self,
        fill: &FillResult,
        cash_after_fill: f64,
    ) -> Result<Option<Trade>, OrderError> {
        self.ensure_matches(fill.order_id)?;
        let state = std::mem::take(&mut self.state);
        let (next, trade) = match state {
            PositionState::Entering { .. } => {
                let equity = cash_after_fill + fill.size as f64 * fill.price;
                (
                    PositionState::Open {
                        position: Position::open(fill, equity),
                    },
                    None,
                )
            }
            PositionState::Adding { mut position, .. } => {
                let equity = cash_after_fill + (position.size + fill.size) as f64 * fill.price;
                position.add(fill, equity);
                (PositionState::Open { position }, None)
            }
            PositionState::Exiting {
                position, reason, ..
            } => (PositionState::Flat, Some(close_trade(&position, fill, reason))),
            other => {
                self.state = other;
                return Err(OrderError::NothingInFlight);
            }
        };
        self.state = next;
        Ok(trade)
    }

    /// The in-flight order was rejected: return to the state before it was submitted.
    pub fn on_reject(&mut self, order_id: OrderId) -> Result<(), OrderError> {
        self.ensure_matches(order_id)?;
        self.restore_prior_state();
        Ok(())
    }

    /// Withdraw the in-flight order: mark it canceled and return to the
    /// state before it was submitted.
    pub fn on_cancel(&mut self, order_id: OrderId) -> Result<(), OrderError> {
        self.ensure_matches(order_id)?;
        if let Some(order) = self.in_flight_mut() {
            order.cancel()?;
        }
        self.restore_prior_state();
        Ok(())
    }

    fn restore_prior_state(&mut self) {
        let state = std::mem::take(&mut self.state);
        self.state = match state {
            PositionState::Entering { .. } => PositionState::Flat,
            PositionState::Adding { position, .. } | PositionState::Exiting { position, .. } => {
                PositionState::Open { position }
            }
            other => other,
        };
    }

    fn ensure_idle(&self) -> Result<(), OrderError> {
        match self.in_flight() {
            Some(pending) => Err(OrderError::OrderInFlight {
                pending: pending.id,
            }),
            None => Ok(()),
        }
    }

    fn ensure_matches(&self, id: OrderId) -> Result<(), OrderError> {
        match self.in_flight() {
            Some(order) if order.id == id => Ok(()),
            Some(_) => Err(OrderError::UnknownOrder { id }),
            None => Err(OrderError::NothingInFlight),
        }
    }
}

fn close_trade(position: &Position, fill: &FillResult, reason: CloseReason) -> Trade {
    let size = position.size;
    let gross_pnl = (fill.slippage_adjusted_price - position.entry_price) * size as f64;
    let commission = position.commission_paid + fill.commission;
    let net_pnl = gross_pnl - commission;
    let cost_basis = position.entry_price * size as f64;
    Trade {
        entry_bar: position.entry_bar,
        entry_timestamp: position.entry_timestamp,
        entry_price: position.entry_price,
        exit_bar: fill.bar_index,
        exit_timestamp: fill.timestamp,
        exit_price: fill.slippage_adjusted_price,
        size,
        added: position.has_added,
        gross_pnl,
        commission,
        net_pnl,
        return_pct: if cost_basis > 0.0 { net_pnl / cost_basis } else { 0.0 },
        bars_held: fill.bar_index.saturating_sub(position.entry_bar),
        close_reason: reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExitReason, OrderSide, StopReason};
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn order(id: u64, purpose: OrderPurpose, size: u64) -> Order {
        Order::new(OrderId(id), purpose, size, 0).unwrap()
    }

    fn fill(id: u64, side: OrderSide, price: f64, size: u64, commission: f64, bar: usize) -> FillResult {
        FillResult {
            order_id: OrderId(id),
            side,
            size,
            price,
            slippage_adjusted_price: price,
            commission,
            notional: price * size as f64,
            slippage_cost: 0.0,
            timestamp: ts(bar as u32 + 1),
            bar_index: bar,
        }
    }

    fn take_profit() -> CloseReason {
        CloseReason::Exit(ExitReason::TakeProfit { gain: 0.2 })
    }

    fn open_book() -> PositionBook {
        let mut book = PositionBook::new();
        book.submit(order(1, OrderPurpose::Enter, 100)).unwrap();
        book.on_fill(&fill(1, OrderSide::Buy, 10.0, 100, 1.0, 2), 9_000.0)
            .unwrap();
        book
    }

    #[test]
    fn full_lifecycle() {
        let mut book = open_book();
        assert_eq!(book.state().label(), "open");
        let pos = book.position().unwrap();
        assert_eq!(pos.size, 100);
        assert!((pos.position_fraction_of_equity - 1_000.0 / 10_000.0).abs() < 1e-12);

        book.submit(order(2, OrderPurpose::AddPosition, 100)).unwrap();
        assert_eq!(book.state().label(), "adding");
        book.on_fill(&fill(2, OrderSide::Buy, 8.0, 100, 1.0, 4), 8_000.0)
            .unwrap();
        let pos = book.position().unwrap();
        assert_eq!(pos.size, 200);
        assert!((pos.entry_price - 9.0).abs() < 1e-12);
        assert!(pos.has_added);

        book.submit_close(order(3, OrderPurpose::Close, 200), take_profit())
            .unwrap();
        let trade = book
            .on_fill(&fill(3, OrderSide::Sell, 11.0, 200, 1.0, 9), 10_199.0)
            .unwrap()
            .unwrap();
        assert!(book.is_flat());
        assert!((trade.gross_pnl - 400.0).abs() < 1e-9);
        assert!((trade.commission - 3.0).abs() < 1e-12);
        assert!((trade.net_pnl - 397.0).abs() < 1e-9);
        assert!((trade.return_pct - 397.0 / 1_800.0).abs() < 1e-12);
        assert_eq!(trade.bars_held, 7);
        assert!(trade.added);
        assert_eq!(trade.close_reason, take_profit());
    }

    #[test]
    fn second_submit_while_in_flight_is_refused() {
        let mut book = PositionBook::new();
        book.submit(order(1, OrderPurpose::Enter, 100)).unwrap();
        let err = book.submit(order(2, OrderPurpose::Enter, 100)).unwrap_err();
        assert_eq!(err, OrderError::OrderInFlight { pending: OrderId(1) });
        assert_eq!(book.in_flight().unwrap().id, OrderId(1));
    }

    #[test]
    fn rejected_entry_returns_to_flat() {
        let mut book = PositionBook::new();
        book.submit(order(1, OrderPurpose::Enter, 100)).unwrap();
        book.on_reject(OrderId(1)).unwrap();
        assert!(book.is_flat());
        assert!(book.in_flight().is_none());
    }

    #[test]
    fn rejected_add_returns_to_open() {
        let mut book = open_book();
        book.submit(order(2, OrderPurpose::AddPosition, 1_000)).unwrap();
        book.on_reject(OrderId(2)).unwrap();
        assert_eq!(book.state().label(), "open");
        assert_eq!(book.position().unwrap().size, 100);
        assert!(!book.position().unwrap().has_added);
    }

    #[test]
    fn canceled_close_returns_to_open() {
        let mut book = open_book();
        book.submit_close(order(2, OrderPurpose::Close, 100), take_profit())
            .unwrap();
        book.on_cancel(OrderId(2)).unwrap();
        assert_eq!(book.state().label(), "open");
        assert_eq!(book.position().unwrap().size, 100);
        assert!(book.in_flight().is_none());

        // A fresh order can go out after the cancel.
        book.submit(order(3, OrderPurpose::AddPosition, 50)).unwrap();
        assert_eq!(book.in_flight().unwrap().id, OrderId(3));
    }

    #[test]
    fn canceled_entry_returns_to_flat() {
        let mut book = PositionBook::new();
        book.submit(order(1, OrderPurpose::Enter, 100)).unwrap();
        assert_eq!(
            book.on_cancel(OrderId(9)),
            Err(OrderError::UnknownOrder { id: OrderId(9) })
        );
        assert_eq!(book.state().label(), "entering");

        book.on_cancel(OrderId(1)).unwrap();
        assert!(book.is_flat());
        assert_eq!(book.on_cancel(OrderId(1)), Err(OrderError::NothingInFlight));
    }

    #[test]
    fn orders_that_do_not_fit_the_state() {
        let mut book = PositionBook::new();
        assert!(matches!(
            book.submit(order(1, OrderPurpose::AddPosition, 100)),
            Err(OrderError::UnexpectedOrder { state: "flat", .. })
        ));
        assert!(book.is_flat());

        let stop = CloseReason::StopLoss(StopReason::FixedStop { loss: 0.1 });
        assert!(book.submit_close(order(2, OrderPurpose::Close, 100), stop).is_err());

        let mut book = open_book();
        assert!(matches!(
            book.submit(order(3, OrderPurpose::Enter, 100)),
            Err(OrderError::UnexpectedOrder { state: "open", .. })
        ));
        // partial close is not allowed
        assert!(book.submit_close(order(4, OrderPurpose::Close, 50), stop).is_err());
        assert_eq!(book.state().label(), "open");
    }

    #[test]
    fn fill_for_unknown_order_is_refused() {
        let mut book = PositionBook::new();
        assert_eq!(
            book.on_fill(&fill(9, OrderSide::Buy, 1.0, 1, 0.0, 0), 0.0),
            Err(OrderError::NothingInFlight)
        );
        book.submit(order(1, OrderPurpose::Enter, 100)).unwrap();
        assert_eq!(
            book.on_fill(&fill(9, OrderSide::Buy, 1.0, 1, 0.0, 0), 0.0),
            Err(OrderError::UnknownOrder { id: OrderId(9) })
        );
    }

    #[test]
    fn mark_updates_high_only_in_position() {
        let mut book = PositionBook::new();
        book.mark(50.0);
        assert!(book.position().is_none());

        let mut book = open_book();
        book.mark(12.0);
        book.mark(11.0);
        assert_eq!(book.position().unwrap().highest_price_since_entry, 12.0);
        assert_eq!(book.position_value(11.0), 1_100.0);
    }
}
