//! Strategy Registry errors

use janus_core::{StrategyId, StrategyStatus};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Strategy already registered: {0}")]
    DuplicateStrategy(StrategyId),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(StrategyId),

    #[error("Illegal transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: StrategyId,
        from: StrategyStatus,
        to: StrategyStatus,
    },

    #[error("Weight budget exceeded: total would be {total}, limit 1.0")]
    WeightBudgetExceeded { total: String },
}

pub type Result<T> = std::result::Result<T, Error>;
