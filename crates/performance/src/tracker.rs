use dashmap::{DashMap, DashSet};
use janus_core::{OutcomeKey, PerformanceSnapshot, StrategyId, Timestamp, TradeOutcome};
use log::debug;

use crate::stats;

/// Result of recording one outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Inserted,
    /// The same (strategy, timestamp, pnl) was seen before; nothing counted
    Duplicate,
}

/// Result of a snapshot request
///
/// A strategy below the minimum trade count gets an explicit
/// insufficient-data answer instead of a misleading zero score.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotResult {
    Ready(PerformanceSnapshot),
    InsufficientData { have: u64, need: u64 },
}

impl SnapshotResult {
    pub fn ready(self) -> Option<PerformanceSnapshot> {
        match self {
            SnapshotResult::Ready(snapshot) => Some(snapshot),
            SnapshotResult::InsufficientData { .. } => None,
        }
    }
}

/// Append-only trade-outcome history with rolling statistics
///
/// Histories live in a concurrent map: the score phase reads many
/// strategies from worker tasks at once, while `record` runs only from
/// the ingest phase (single writer). Reprocessing a batch of outcomes is
/// safe; duplicates are dropped by key.
pub struct PerformanceTracker {
    histories: DashMap<StrategyId, Vec<TradeOutcome>>,
    seen: DashSet<OutcomeKey>,
    min_trades_for_snapshot: u64,
}

impl PerformanceTracker {
    pub fn new(min_trades_for_snapshot: u64) -> Self {
        Self {
            histories: DashMap::new(),
            seen: DashSet::new(),
            min_trades_for_snapshot,
        }
    }

    /// Append one outcome; idempotent on the outcome key
    pub fn record(&self, outcome: TradeOutcome) -> Recorded {
        if !self.seen.insert(outcome.key()) {
            debug!(
                "[PERF] Dropped duplicate outcome for {} at {}",
                outcome.strategy_id, outcome.timestamp
            );
            return Recorded::Duplicate;
        }
        self.histories
            .entry(outcome.strategy_id.clone())
            .or_default()
            .push(outcome);
        Recorded::Inserted
    }

    /// Number of recorded outcomes for a strategy
    pub fn trade_count(&self, id: &StrategyId) -> u64 {
        self.histories.get(id).map(|h| h.len() as u64).unwrap_or(0)
    }

    /// The most recent `window` outcomes for a strategy, oldest first
    pub fn window(&self, id: &StrategyId, window: usize) -> Vec<TradeOutcome> {
        match self.histories.get(id) {
            Some(history) => {
                let start = history.len().saturating_sub(window);
                history[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Compute rolling statistics over the last `window` outcomes
    pub fn snapshot(&self, id: &StrategyId, window: usize, as_of: Timestamp) -> SnapshotResult {
        let outcomes = self.window(id, window);
        let have = outcomes.len() as u64;
        if have < self.min_trades_for_snapshot {
            return SnapshotResult::InsufficientData {
                have,
                need: self.min_trades_for_snapshot,
            };
        }

        let pnls_dec: Vec<_> = outcomes.iter().map(|o| o.realized_pnl).collect();
        let pnls: Vec<f64> = pnls_dec.iter().map(|p| stats::to_f64(*p)).collect();
        let wins = outcomes.iter().filter(|o| o.win).count();

        SnapshotResult::Ready(PerformanceSnapshot {
            strategy_id: id.clone(),
            as_of,
            sharpe: stats::sharpe_like(&pnls),
            win_rate: wins as f64 / outcomes.len() as f64,
            max_drawdown: stats::max_drawdown(&pnls_dec),
            trade_count: have,
        })
    }
}
