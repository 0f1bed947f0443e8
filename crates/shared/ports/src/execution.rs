use async_trait::async_trait;
use janus_core::{Decision, DecisionId, TradeOutcome, Timestamp};

use crate::error::PortResult;

/// Venue acknowledgement for a submitted decision
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionAck {
    pub decision_id: DecisionId,
    pub accepted_at: Timestamp,
}

/// Port for the order-execution collaborator
///
/// Submission is asynchronous: an approved decision is handed over and
/// the realized `TradeOutcome` arrives on a later cycle via `poll_fills`.
/// A submit that times out leaves the decision pending for reconciliation;
/// it never rolls the decision back.
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Hand an approved decision to the venue
    async fn submit(&self, decision: &Decision) -> PortResult<ExecutionAck>;

    /// Drain realized outcomes since the last poll
    async fn poll_fills(&self) -> PortResult<Vec<TradeOutcome>>;
}
