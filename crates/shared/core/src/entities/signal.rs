use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::StrategyId;
use crate::values::{Symbol, Timestamp};

/// Normalized market/strategy observation from the external scanner
///
/// One per (strategy, asset) per cycle after ingest normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalObservation {
    pub strategy_id: StrategyId,
    pub asset: Symbol,
    pub spread: Decimal,
    pub volume_usd: Decimal,
    /// Scanner confidence in [0, 1]
    pub confidence: f64,
    pub observed_at: Timestamp,
}
