//! Domain types for SwingLab

pub mod bar;
pub mod fill;
pub mod frequency;
pub mod ids;
pub mod order;
pub mod portfolio;
pub mod position;
pub mod trade;

pub use bar::{validate_bars, Bar, DataError};
pub use fill::FillResult;
pub use frequency::BarFrequency;
pub use ids::{ConfigHash, IdGen, OrderId};
pub use order::{Order, OrderError, OrderPurpose, OrderSide, OrderStatus};
pub use portfolio::{EquityPoint, Portfolio};
pub use position::Position;
pub use trade::{CloseReason, ExitReason, StopReason, Trade};
