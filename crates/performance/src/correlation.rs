use janus_core::{CorrelationMatrix, StrategyId, Timestamp};
use log::debug;

use crate::stats;
use crate::tracker::PerformanceTracker;

/// Pairwise return-correlation estimator
///
/// Correlation is computed over aligned per-period returns: the two
/// strategies' windowed pnl series are paired most-recent-first over the
/// shared overlap. Pairs with fewer than `min_overlap` observations are
/// undefined and downstream scoring assumes 0 (no diversification
/// credit), which is the conservative default.
pub struct CorrelationEstimator {
    min_overlap: usize,
}

impl CorrelationEstimator {
    pub fn new(min_overlap: usize) -> Self {
        Self { min_overlap }
    }

    /// Pearson correlation of two strategies' aligned returns, or None
    /// when the overlap is too small or a series is degenerate.
    pub fn correlate(
        &self,
        tracker: &PerformanceTracker,
        a: &StrategyId,
        b: &StrategyId,
        window: usize,
    ) -> Option<f64> {
        let history_a = tracker.window(a, window);
        let history_b = tracker.window(b, window);

        let overlap = history_a.len().min(history_b.len());
        if overlap < self.min_overlap {
            debug!(
                "[PERF] Correlation {} / {} undefined: overlap {} < {}",
                a, b, overlap, self.min_overlap
            );
            return None;
        }

        // Align the most recent `overlap` observations of each side
        let xs: Vec<f64> = history_a[history_a.len() - overlap..]
            .iter()
            .map(|o| stats::to_f64(o.realized_pnl))
            .collect();
        let ys: Vec<f64> = history_b[history_b.len() - overlap..]
            .iter()
            .map(|o| stats::to_f64(o.realized_pnl))
            .collect();

        stats::pearson(&xs, &ys)
    }

    /// Recompute the full matrix for the given strategies.
    ///
    /// Called once per rebalance cycle, never per trade, to bound cost.
    pub fn matrix(
        &self,
        tracker: &PerformanceTracker,
        ids: &[StrategyId],
        window: usize,
        as_of: Timestamp,
    ) -> CorrelationMatrix {
        let mut matrix = CorrelationMatrix::new(as_of);
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                if let Some(rho) = self.correlate(tracker, a, b, window) {
                    matrix.set(a, b, rho);
                }
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn fill(tracker: &PerformanceTracker, id: &str, pnls: &[Decimal]) {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        for (i, pnl) in pnls.iter().enumerate() {
            tracker.record(janus_core::TradeOutcome::new(
                id,
                base + Duration::minutes(i as i64),
                *pnl,
            ));
        }
    }

    #[test]
    fn test_identical_series_correlate_fully() {
        let tracker = PerformanceTracker::new(1);
        let pnls = [dec!(1), dec!(-2), dec!(3), dec!(-1), dec!(2)];
        fill(&tracker, "a", &pnls);
        fill(&tracker, "b", &pnls);

        let estimator = CorrelationEstimator::new(3);
        let rho = estimator
            .correlate(&tracker, &"a".into(), &"b".into(), 50)
            .unwrap();
        assert!((rho - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_overlap_is_undefined() {
        let tracker = PerformanceTracker::new(1);
        fill(&tracker, "a", &[dec!(1), dec!(2)]);
        fill(&tracker, "b", &[dec!(1), dec!(2), dec!(3), dec!(4)]);

        let estimator = CorrelationEstimator::new(3);
        assert_eq!(
            estimator.correlate(&tracker, &"a".into(), &"b".into(), 50),
            None
        );
    }

    #[test]
    fn test_constant_series_is_undefined() {
        let tracker = PerformanceTracker::new(1);
        fill(&tracker, "a", &[dec!(5), dec!(5), dec!(5), dec!(5)]);
        fill(&tracker, "b", &[dec!(1), dec!(-2), dec!(3), dec!(-1)]);

        let estimator = CorrelationEstimator::new(3);
        assert_eq!(
            estimator.correlate(&tracker, &"a".into(), &"b".into(), 50),
            None
        );
    }

    #[test]
    fn test_matrix_covers_defined_pairs_only() {
        let tracker = PerformanceTracker::new(1);
        let pnls = [dec!(1), dec!(-2), dec!(3), dec!(-1), dec!(2)];
        fill(&tracker, "a", &pnls);
        fill(&tracker, "b", &pnls);
        fill(&tracker, "c", &[dec!(1)]); // too short

        let ids: Vec<StrategyId> = vec!["a".into(), "b".into(), "c".into()];
        let estimator = CorrelationEstimator::new(3);
        let matrix = estimator.matrix(&tracker, &ids, 50, Utc::now());

        assert!(matrix.get(&ids[0], &ids[1]).is_some());
        assert_eq!(matrix.get(&ids[0], &ids[2]), None);
        assert_eq!(matrix.len(), 1);
    }
}
