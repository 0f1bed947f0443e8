//! Janus Allocation Rebalancer
//!
//! Periodically recomputes allocation weights from performance snapshots
//! and pairwise correlations. Runs on the rebalance trigger, not every
//! cycle. Repeated runs over identical inputs produce identical weights:
//! candidates are ordered deterministically and all rounding is toward
//! zero, so the post-rebalance total can never exceed the budget.

mod rebalancer;

pub use rebalancer::{AllocationRebalancer, RebalanceInput, WeightChange};
