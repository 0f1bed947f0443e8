use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StrategyId;
use crate::values::{Symbol, Timestamp};

/// Unique identifier for a gate decision
pub type DecisionId = Uuid;

/// What a strategy wants to do with its allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposedAction {
    /// Open new exposure
    Enter,
    /// Close existing exposure
    Exit,
    /// Grow existing exposure
    Resize,
}

impl ProposedAction {
    /// Returns true if the action puts new capital at risk.
    ///
    /// Exits release risk and pass the loss-based gates; they are still
    /// blocked by a trading halt.
    pub fn is_new_risk(&self) -> bool {
        matches!(self, ProposedAction::Enter | ProposedAction::Resize)
    }
}

/// A sized action awaiting gate evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub strategy_id: StrategyId,
    pub asset: Symbol,
    pub action: ProposedAction,
    pub size: Decimal,
    pub confidence: f64,
}

/// Terminal verdict of the gate chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateResult {
    Approved,
    Rejected,
    /// Approved at a reduced size
    Throttled,
}

/// One gated proposal, as emitted on the decision stream
///
/// Append-only output of a cycle. The reason is a machine-readable code
/// sufficient to reconstruct the verdict after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub cycle_id: u64,
    pub strategy_id: StrategyId,
    pub asset: Symbol,
    pub action: ProposedAction,
    /// Final size after any throttling
    pub size: Decimal,
    pub gate_result: GateResult,
    pub reason: String,
    pub decided_at: Timestamp,
}

impl Decision {
    /// Gate-relevant view used for replay comparison: everything except
    /// the freshly generated id and wall-clock timestamp.
    pub fn replay_key(&self) -> (u64, &StrategyId, ProposedAction, Decimal, GateResult, &str) {
        (
            self.cycle_id,
            &self.strategy_id,
            self.action,
            self.size,
            self.gate_result,
            self.reason.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_risk_classification() {
        assert!(ProposedAction::Enter.is_new_risk());
        assert!(ProposedAction::Resize.is_new_risk());
        assert!(!ProposedAction::Exit.is_new_risk());
    }
}
