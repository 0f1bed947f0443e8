//! Domain entities
//!
//! Strategy lifecycle, trade history, derived statistics, risk state and
//! gate decisions. Each mutable entity is owned by exactly one component at
//! runtime; history types are append-only.

mod correlation;
mod decision;
mod outcome;
mod risk_state;
mod signal;
mod snapshot;
mod strategy;

pub use correlation::CorrelationMatrix;
pub use decision::{Decision, DecisionId, GateResult, Proposal, ProposedAction};
pub use outcome::{OutcomeKey, TradeOutcome};
pub use risk_state::RiskState;
pub use signal::SignalObservation;
pub use snapshot::PerformanceSnapshot;
pub use strategy::{Strategy, StrategyId, StrategyKind, StrategyStatus};
