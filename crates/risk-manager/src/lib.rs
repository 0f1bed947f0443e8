//! Janus Risk Gate
//!
//! A fixed-order chain of independent safety checks invoked on every
//! proposed action:
//!
//! 1. Leverage health (emergency halt / throttle band)
//! 2. Daily loss limit
//! 3. Consecutive-loss circuit breaker
//! 4. Position sizing (clamp or deny)
//!
//! The chain short-circuits on the first denial and returns a single
//! composite decision. Each check is a pure function of the risk state,
//! the proposal and the live inputs; the gate mutates only the working
//! state the orchestrator hands it, so an aborted cycle commits nothing.

mod checks;
mod gate;
mod limits;

pub use checks::{GateInputs, Verdict, reason};
pub use gate::RiskGate;
pub use limits::{LeverageThresholds, RiskLimits};
