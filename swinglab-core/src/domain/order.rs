//! Orders and their lifecycle.
//!
//! Every order is a market-on-close order for the whole requested size.
//! An order starts `Pending` and moves exactly once to a terminal status.

use super::ids::OrderId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// +1 for buys, -1 for sells. Used to push slippage against the trader.
    pub fn sign(self) -> f64 {
        match self {
            OrderSide::Buy => 1.0,
            OrderSide::Sell => -1.0,
        }
    }
}

/// Why an order was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderPurpose {
    Enter,
    AddPosition,
    Close,
}

impl OrderPurpose {
    pub fn side(self) -> OrderSide {
        match self {
            OrderPurpose::Enter | OrderPurpose::AddPosition => OrderSide::Buy,
            OrderPurpose::Close => OrderSide::Sell,
        }
    }
}

/// Order lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Filled,
    /// Refused by the broker (e.g. insufficient cash).
    Rejected { reason: String },
    Canceled,
}

impl OrderStatus {
    fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Filled => "filled",
            OrderStatus::Rejected { .. } => "rejected",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors from the order and position state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order {pending} is still in flight; cannot submit another")]
    OrderInFlight { pending: OrderId },

    #[error("{id}: cannot move from {from} to {to}")]
    InvalidTransition {
        id: OrderId,
        from: &'static str,
        to: &'static str,
    },

    #[error("{purpose:?} order does not fit position state {state}")]
    UnexpectedOrder {
        purpose: OrderPurpose,
        state: &'static str,
    },

    #[error("order {id} does not match the order in flight")]
    UnknownOrder { id: OrderId },

    #[error("no order in flight")]
    NothingInFlight,

    #[error("order size must be > 0")]
    ZeroSize,
}

/// A single market-on-close order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub purpose: OrderPurpose,
    pub side: OrderSide,
    pub requested_size: u64,
    pub status: OrderStatus,
    pub created_bar: usize,
}

impl Order {
    pub fn new(
        id: OrderId,
        purpose: OrderPurpose,
        requested_size: u64,
        created_bar: usize,
    ) -> Result<Self, OrderError> {
        if requested_size == 0 {
            return Err(OrderError::ZeroSize);
        }
        Ok(Self {
            id,
            purpose,
            side: purpose.side(),
            requested_size,
            status: OrderStatus::Pending,
            created_bar,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn mark_filled(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Filled)
    }

    pub fn mark_rejected(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        self.transition(OrderStatus::Rejected {
            reason: reason.into(),
        })
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Canceled)
    }

    fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        if !self.is_pending() {
            return Err(OrderError::InvalidTransition {
                id: self.id,
                from: self.status.label(),
                to: to.label(),
            });
        }
        self.status = to;
        Ok(())
    }
}
