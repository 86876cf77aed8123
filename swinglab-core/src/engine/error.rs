use crate::config::ConfigError;
use crate::domain::{DataError, OrderError};
use thiserror::Error;

/// Any failure that stops a simulation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid input data: {0}")]
    Data(#[from] DataError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("order state violation: {0}")]
    Order(#[from] OrderError),
}
