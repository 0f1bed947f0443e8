//! Janus Strategy Registry
//!
//! Owns the canonical set of strategies and their lifecycle state:
//! - Registration with duplicate protection
//! - Lifecycle transitions validated against an explicit state machine
//! - Allocation-weight mutations under the global 1.0 budget and the
//!   incubation cap
//! - Periodic promotion/demotion reviews driven by performance snapshots
//!
//! Every mutation is logged with before/after state for auditability.

mod error;
mod registry;
mod review;

pub use error::{Error, Result};
pub use registry::StrategyRegistry;
pub use review::{ReviewAction, ReviewOutcome, ReviewPolicy};
