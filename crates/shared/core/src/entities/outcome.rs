use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::StrategyId;
use crate::values::Timestamp;

/// Realized result of one executed trade
///
/// Produced asynchronously by the execution collaborator. Append-only:
/// never mutated or deleted once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub strategy_id: StrategyId,
    pub timestamp: Timestamp,
    pub realized_pnl: Decimal,
    pub win: bool,
}

impl TradeOutcome {
    pub fn new(
        strategy_id: impl Into<StrategyId>,
        timestamp: Timestamp,
        realized_pnl: Decimal,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            timestamp,
            realized_pnl,
            win: realized_pnl > Decimal::ZERO,
        }
    }

    /// Identity used for idempotent record-keeping: replaying the same
    /// outcome must not double-count.
    pub fn key(&self) -> OutcomeKey {
        OutcomeKey {
            strategy_id: self.strategy_id.clone(),
            timestamp: self.timestamp,
            realized_pnl: self.realized_pnl,
        }
    }
}

/// Deduplication key for a trade outcome
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutcomeKey {
    pub strategy_id: StrategyId,
    pub timestamp: Timestamp,
    pub realized_pnl: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_win_flag_follows_pnl_sign() {
        let now = Utc::now();
        assert!(TradeOutcome::new("s1", now, dec!(12.5)).win);
        assert!(!TradeOutcome::new("s1", now, dec!(-3.0)).win);
        assert!(!TradeOutcome::new("s1", now, Decimal::ZERO).win);
    }

    #[test]
    fn test_key_identity() {
        let now = Utc::now();
        let a = TradeOutcome::new("s1", now, dec!(5));
        let b = TradeOutcome::new("s1", now, dec!(5));
        let c = TradeOutcome::new("s1", now, dec!(6));
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }
}
