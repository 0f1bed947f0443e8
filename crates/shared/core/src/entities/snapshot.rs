use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::StrategyId;
use crate::values::Timestamp;

/// Rolling performance statistics for one strategy
///
/// Emitted by the performance tracker once a strategy has enough history.
/// Snapshots form an append-only series; the latest per strategy feeds
/// rebalancing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub strategy_id: StrategyId,
    pub as_of: Timestamp,
    /// Mean trade pnl divided by its standard deviation over the window.
    /// Zero when the stdev is zero or undefined.
    pub sharpe: f64,
    pub win_rate: f64,
    /// Peak-to-trough decline of the cumulative pnl curve, >= 0
    pub max_drawdown: Decimal,
    pub trade_count: u64,
}
