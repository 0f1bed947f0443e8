use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::Timestamp;

/// Unique identifier for a strategy
///
/// This provides a stable reference to a strategy that can be stored in
/// decisions and used as map keys, without copying the full strategy record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StrategyId(pub String);

impl StrategyId {
    /// Create a new strategy ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for StrategyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StrategyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Broad family a strategy belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    Momentum,
    MeanReversion,
    Arbitrage,
    MarketMaking,
    /// Anything that doesn't fit the named families
    Custom(String),
}

/// Strategy lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyStatus {
    /// Trial period with a small, capped allocation
    Incubating,
    /// Fully eligible for score-proportional allocation
    Active,
    /// Temporarily sidelined after a persistently negative score
    Paused,
    /// Permanently removed from allocation
    Retired,
}

impl StrategyStatus {
    /// Returns true if the lifecycle edge `self -> next` is legal.
    ///
    /// Legal edges: Incubating -> Active, Active -> Paused,
    /// Paused -> Active, Paused -> Retired.
    pub fn can_transition_to(&self, next: StrategyStatus) -> bool {
        use StrategyStatus::*;
        matches!(
            (self, next),
            (Incubating, Active) | (Active, Paused) | (Paused, Active) | (Paused, Retired)
        )
    }

    /// Returns true if the strategy may receive allocation weight
    pub fn is_allocatable(&self) -> bool {
        matches!(self, StrategyStatus::Incubating | StrategyStatus::Active)
    }
}

impl std::fmt::Display for StrategyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StrategyStatus::Incubating => "incubating",
            StrategyStatus::Active => "active",
            StrategyStatus::Paused => "paused",
            StrategyStatus::Retired => "retired",
        };
        write!(f, "{}", s)
    }
}

/// A trading strategy under management
///
/// Owned exclusively by the registry; mutated only through lifecycle
/// transitions and rebalance weight updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: StrategyId,
    pub name: String,
    pub kind: StrategyKind,
    pub status: StrategyStatus,
    /// Fraction of tradable equity this strategy may risk, in [0, 1]
    pub allocation_weight: Decimal,
    pub inception_time: Timestamp,
    pub trade_count: u64,
    /// Consecutive reviews that ended in demotion
    pub failed_reviews: u32,
    pub notes: String,
}

impl Strategy {
    /// Create a new strategy, starting in incubation with zero weight
    pub fn new(
        id: impl Into<StrategyId>,
        name: impl Into<String>,
        kind: StrategyKind,
        inception_time: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            status: StrategyStatus::Incubating,
            allocation_weight: Decimal::ZERO,
            inception_time,
            trade_count: 0,
            failed_reviews: 0,
            notes: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_new_strategy_starts_incubating() {
        let s = Strategy::new("grid-btc", "BTC grid", StrategyKind::MarketMaking, Utc::now());
        assert_eq!(s.status, StrategyStatus::Incubating);
        assert_eq!(s.allocation_weight, Decimal::ZERO);
        assert_eq!(s.trade_count, 0);
    }

    #[test]
    fn test_legal_transitions() {
        use StrategyStatus::*;
        assert!(Incubating.can_transition_to(Active));
        assert!(Active.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Active));
        assert!(Paused.can_transition_to(Retired));
    }

    #[test]
    fn test_illegal_transitions() {
        use StrategyStatus::*;
        assert!(!Incubating.can_transition_to(Paused));
        assert!(!Incubating.can_transition_to(Retired));
        assert!(!Active.can_transition_to(Incubating));
        assert!(!Active.can_transition_to(Retired));
        assert!(!Retired.can_transition_to(Active));
        assert!(!Retired.can_transition_to(Paused));
    }

    #[test]
    fn test_allocatable_statuses() {
        use StrategyStatus::*;
        assert!(Incubating.is_allocatable());
        assert!(Active.is_allocatable());
        assert!(!Paused.is_allocatable());
        assert!(!Retired.is_allocatable());
    }
}
