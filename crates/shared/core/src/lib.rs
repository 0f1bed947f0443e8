//! Janus Core Domain
//!
//! Pure domain types for the Janus strategy-allocation and risk-gating
//! system. This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    CorrelationMatrix,
    Decision,
    DecisionId,
    GateResult,
    PerformanceSnapshot,
    ProposedAction,
    Proposal,
    RiskState,
    SignalObservation,
    Strategy,
    StrategyId,
    StrategyKind,
    StrategyStatus,
    TradeOutcome,
    OutcomeKey,
};
pub use values::{Symbol, Timestamp};
