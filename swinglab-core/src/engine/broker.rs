//! Broker simulator: executes orders at the bar close and keeps the cash ledger.
//!
//! Fills are synchronous. An order submitted on bar T is filled or rejected
//! on bar T, at T's close adjusted for slippage.

use super::cost_model::CostModel;
use crate::config::BrokerConfig;
use crate::domain::{Bar, EquityPoint, FillResult, Order, OrderError, OrderSide, Portfolio};
use chrono::NaiveDateTime;
use tracing::{debug, warn};

/// Result of presenting an order to the broker.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    Filled(FillResult),
    Rejected { reason: String },
}

#[derive(Debug, Clone)]
pub struct Broker {
    cost: CostModel,
    portfolio: Portfolio,
}

impl Broker {
    pub fn new(config: &BrokerConfig) -> Self {
        Self {
            cost: CostModel::from_broker(config),
            portfolio: Portfolio::new(config.initial_cash),
        }
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost
    }

    pub fn cash(&self) -> f64 {
        self.portfolio.cash
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn into_portfolio(self) -> Portfolio {
        self.portfolio
    }

    /// Cash plus the given position value.
    pub fn equity(&self, position_value: f64) -> f64 {
        self.portfolio.equity(position_value)
    }

    /// Fill `order` at the bar close, or reject it.
    ///
    /// A buy whose cost (notional plus commission) exceeds available cash is
    /// rejected and leaves cash untouched. The order's status is updated either way.
    pub fn execute(
        &mut self,
        order: &mut Order,
        bar: &Bar,
        bar_index: usize,
    ) -> Result<Execution, OrderError> {
        let (slipped, slippage_cost) =
            self.cost
                .apply_slippage(bar.close, order.side, order.requested_size);
        let notional = slipped * order.requested_size as f64;
        let commission = self.cost.compute_commission(slipped, order.requested_size);

        if order.side == OrderSide::Buy && notional + commission > self.portfolio.cash {
            let reason = format!(
                "insufficient cash: need {:.2}, have {:.2}",
                notional + commission,
                self.portfolio.cash
            );
            warn!(order = %order.id, bar_index, %reason, "order rejected");
            order.mark_rejected(reason.clone())?;
            return Ok(Execution::Rejected { reason });
        }

        order.mark_filled()?;
        let fill = FillResult {
            order_id: order.id,
            side: order.side,
            size: order.requested_size,
            price: bar.close,
            slippage_adjusted_price: slipped,
            commission,
            notional,
            slippage_cost,
            timestamp: bar.timestamp,
            bar_index,
        };
        self.portfolio.apply_fill(&fill);
        debug!(
            order = %order.id,
            side = ?fill.side,
            size = fill.size,
            price = fill.slippage_adjusted_price,
            commission = fill.commission,
            cash = self.portfolio.cash,
            "order filled"
        );
        Ok(Execution::Filled(fill))
    }

    /// Append the bar's equity point. Returns the recorded equity.
    pub fn record_equity(&mut self, timestamp: NaiveDateTime, position_value: f64) -> f64 {
        self.portfolio.record_equity(timestamp, position_value)
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.portfolio.equity_curve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderId, OrderPurpose, OrderStatus};
    use chrono::NaiveDate;

    fn bar(close: f64) -> Bar {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Bar::new(ts, close, close, close, close, 10_000.0)
    }

    fn order(purpose: OrderPurpose, size: u64) -> Order {
        Order::new(OrderId(1), purpose, size, 0).unwrap()
    }

    #[test]
    fn buy_fill_pays_slippage_and_commission() {
        let mut broker = Broker::new(&BrokerConfig::new(100_000.0, 0.00025, 0.001));
        let mut o = order(OrderPurpose::Enter, 100);
        let Execution::Filled(fill) = broker.execute(&mut o, &bar(50.0), 3).unwrap() else {
            panic!("expected fill");
        };
        assert_eq!(o.status, OrderStatus::Filled);
        assert!((fill.slippage_adjusted_price - 50.05).abs() < 1e-10);
        assert!((fill.notional - 5_005.0).abs() < 1e-9);
        assert!((fill.commission - 5_005.0 * 0.00025).abs() < 1e-12);
        assert!((broker.cash() - (100_000.0 - 5_005.0 - 1.25125)).abs() < 1e-9);
        assert_eq!(fill.bar_index, 3);
        assert_eq!(fill.price, 50.0);
    }

    #[test]
    fn sell_fill_receives_less() {
        let mut broker = Broker::new(&BrokerConfig::new(10_000.0, 0.001, 0.002));
        let mut o = order(OrderPurpose::Close, 100);
        let Execution::Filled(fill) = broker.execute(&mut o, &bar(100.0), 0).unwrap() else {
            panic!("expected fill");
        };
        assert!((fill.slippage_adjusted_price - 99.8).abs() < 1e-10);
        let expected_cash = 10_000.0 + 9_980.0 - 9.98;
        assert!((broker.cash() - expected_cash).abs() < 1e-9);
    }

    #[test]
    fn unaffordable_buy_is_rejected() {
        let mut broker = Broker::new(&BrokerConfig::new(1_000.0, 0.0, 0.0));
        let mut o = order(OrderPurpose::Enter, 100);
        let exec = broker.execute(&mut o, &bar(10.5), 0).unwrap();
        assert!(matches!(exec, Execution::Rejected { .. }));
        assert!(matches!(o.status, OrderStatus::Rejected { .. }));
        assert_eq!(broker.cash(), 1_000.0);
    }

    #[test]
    fn commission_can_tip_a_buy_into_rejection() {
        // notional exactly equals cash, commission pushes it over
        let mut broker = Broker::new(&BrokerConfig::new(1_000.0, 0.001, 0.0));
        let mut o = order(OrderPurpose::Enter, 100);
        assert!(matches!(
            broker.execute(&mut o, &bar(10.0), 0).unwrap(),
            Execution::Rejected { .. }
        ));
    }

    #[test]
    fn executing_a_settled_order_fails() {
        let mut broker = Broker::new(&BrokerConfig::frictionless(10_000.0));
        let mut o = order(OrderPurpose::Enter, 10);
        broker.execute(&mut o, &bar(10.0), 0).unwrap();
        assert!(matches!(
            broker.execute(&mut o, &bar(10.0), 1),
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn equity_curve_records_once_per_call() {
        let mut broker = Broker::new(&BrokerConfig::frictionless(5_000.0));
        let eq = broker.record_equity(bar(1.0).timestamp, 250.0);
        assert_eq!(eq, 5_250.0);
        assert_eq!(broker.equity_curve().len(), 1);
    }
}
