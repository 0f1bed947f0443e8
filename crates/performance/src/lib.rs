//! Janus Performance Tracking
//!
//! Rolling statistics over append-only trade history:
//! - **PerformanceTracker**: idempotent outcome recording and per-strategy
//!   snapshots (win rate, Sharpe-like score, max drawdown)
//! - **CorrelationEstimator**: pairwise Pearson correlation across
//!   strategies with overlapping histories
//!
//! History is held in a concurrent map so score-phase workers can read
//! any number of strategies in parallel; recording stays a single-writer
//! concern of the ingest phase.

mod correlation;
mod stats;
mod tracker;

pub use correlation::CorrelationEstimator;
pub use tracker::{PerformanceTracker, Recorded, SnapshotResult};
