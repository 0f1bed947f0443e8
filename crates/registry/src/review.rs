use std::collections::HashMap;

use janus_core::{PerformanceSnapshot, StrategyId, StrategyStatus};
use log::info;
use serde::{Deserialize, Serialize};

use crate::registry::StrategyRegistry;

/// Promotion/demotion thresholds
///
/// A strategy graduates from incubation once it has both enough history
/// and good-enough risk-adjusted performance; it is sidelined once its
/// rolling score turns negative, and retired after too many failed
/// reviews in a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPolicy {
    /// Trades required before a review considers the statistics meaningful
    pub min_trades: u64,
    pub promotion_sharpe: f64,
    pub promotion_win_rate: f64,
    /// At or below this score a strategy is considered failing
    pub demotion_sharpe: f64,
    pub max_failed_reviews: u32,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            min_trades: 20,
            promotion_sharpe: 1.0,
            promotion_win_rate: 0.55,
            demotion_sharpe: 0.0,
            max_failed_reviews: 3,
        }
    }
}

impl ReviewPolicy {
    fn meets_promotion(&self, snapshot: &PerformanceSnapshot) -> bool {
        snapshot.trade_count >= self.min_trades
            && snapshot.sharpe >= self.promotion_sharpe
            && snapshot.win_rate >= self.promotion_win_rate
    }

    fn meets_demotion(&self, snapshot: &PerformanceSnapshot) -> bool {
        snapshot.trade_count >= self.min_trades && snapshot.sharpe <= self.demotion_sharpe
    }
}

/// What a review decided for one strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewOutcome {
    /// Incubating -> Active
    Promoted,
    /// Active -> Paused
    Demoted,
    /// Paused -> Active after recovery
    Reinstated,
    /// Paused -> Retired after repeated failed reviews
    Retired,
}

/// Audit record of one applied review action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAction {
    pub strategy_id: StrategyId,
    pub outcome: ReviewOutcome,
    pub reason: String,
}

impl StrategyRegistry {
    /// Run one promotion/demotion pass over the latest snapshots.
    ///
    /// Strategies without a snapshot (insufficient data) are skipped.
    /// Returns the applied actions for the audit/decision stream.
    pub fn review(
        &mut self,
        snapshots: &HashMap<StrategyId, PerformanceSnapshot>,
        policy: &ReviewPolicy,
    ) -> Vec<ReviewAction> {
        let ids: Vec<StrategyId> = self.all().map(|s| s.id.clone()).collect();
        let mut actions = Vec::new();

        for id in ids {
            let Some(snapshot) = snapshots.get(&id) else {
                continue;
            };
            let Some(strategy) = self.get(&id) else {
                continue;
            };

            let action = match strategy.status {
                StrategyStatus::Incubating if policy.meets_promotion(snapshot) => {
                    self.promote(&id, snapshot, ReviewOutcome::Promoted)
                }
                StrategyStatus::Active if policy.meets_demotion(snapshot) => {
                    self.demote(&id, snapshot, policy)
                }
                StrategyStatus::Paused if policy.meets_promotion(snapshot) => {
                    self.promote(&id, snapshot, ReviewOutcome::Reinstated)
                }
                StrategyStatus::Paused if policy.meets_demotion(snapshot) => {
                    self.fail_paused_review(&id, snapshot, policy)
                }
                _ => None,
            };
            actions.extend(action);
        }
        actions
    }

    fn promote(
        &mut self,
        id: &StrategyId,
        snapshot: &PerformanceSnapshot,
        outcome: ReviewOutcome,
    ) -> Option<ReviewAction> {
        self.transition(id, StrategyStatus::Active).ok()?;
        if let Some(strategy) = self.get_mut(id) {
            strategy.failed_reviews = 0;
        }
        let reason = format!(
            "sharpe {:.2} win_rate {:.2} over {} trades",
            snapshot.sharpe, snapshot.win_rate, snapshot.trade_count
        );
        info!("[REGISTRY] Review promoted {}: {}", id, reason);
        Some(ReviewAction {
            strategy_id: id.clone(),
            outcome,
            reason,
        })
    }

    fn demote(
        &mut self,
        id: &StrategyId,
        snapshot: &PerformanceSnapshot,
        policy: &ReviewPolicy,
    ) -> Option<ReviewAction> {
        self.transition(id, StrategyStatus::Paused).ok()?;
        let failed = {
            let strategy = self.get_mut(id)?;
            strategy.failed_reviews += 1;
            strategy.failed_reviews
        };
        let reason = format!(
            "sharpe {:.2} <= {:.2} over {} trades (failed review {}/{})",
            snapshot.sharpe,
            policy.demotion_sharpe,
            snapshot.trade_count,
            failed,
            policy.max_failed_reviews
        );
        info!("[REGISTRY] Review demoted {}: {}", id, reason);
        Some(ReviewAction {
            strategy_id: id.clone(),
            outcome: ReviewOutcome::Demoted,
            reason,
        })
    }

    /// A paused strategy that keeps failing reviews is eventually retired
    fn fail_paused_review(
        &mut self,
        id: &StrategyId,
        snapshot: &PerformanceSnapshot,
        policy: &ReviewPolicy,
    ) -> Option<ReviewAction> {
        let failed = {
            let strategy = self.get_mut(id)?;
            strategy.failed_reviews += 1;
            strategy.failed_reviews
        };

        if failed >= policy.max_failed_reviews {
            self.transition(id, StrategyStatus::Retired).ok()?;
            let reason = format!(
                "{} failed reviews (last sharpe {:.2})",
                failed, snapshot.sharpe
            );
            info!("[REGISTRY] Review retired {}: {}", id, reason);
            return Some(ReviewAction {
                strategy_id: id.clone(),
                outcome: ReviewOutcome::Retired,
                reason,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use janus_core::{Strategy, StrategyKind};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn snapshot(id: &str, sharpe: f64, win_rate: f64, trades: u64) -> PerformanceSnapshot {
        PerformanceSnapshot {
            strategy_id: id.into(),
            as_of: Utc::now(),
            sharpe,
            win_rate,
            max_drawdown: Decimal::ZERO,
            trade_count: trades,
        }
    }

    fn registry_with(ids: &[(&str, StrategyStatus)]) -> StrategyRegistry {
        let mut registry = StrategyRegistry::new(dec!(0.05));
        for (id, status) in ids {
            registry
                .register(Strategy::new(
                    *id,
                    id.to_uppercase(),
                    StrategyKind::Momentum,
                    Utc::now(),
                ))
                .unwrap();
            if *status == StrategyStatus::Active {
                registry.transition(&(*id).into(), StrategyStatus::Active).unwrap();
            } else if *status == StrategyStatus::Paused {
                registry.transition(&(*id).into(), StrategyStatus::Active).unwrap();
                registry.transition(&(*id).into(), StrategyStatus::Paused).unwrap();
            }
        }
        registry
    }

    #[test]
    fn test_promotes_strong_incubating_strategy() {
        let mut registry = registry_with(&[("inc", StrategyStatus::Incubating)]);
        let mut snapshots = HashMap::new();
        snapshots.insert("inc".into(), snapshot("inc", 1.2, 0.62, 20));

        let actions = registry.review(&snapshots, &ReviewPolicy::default());

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].outcome, ReviewOutcome::Promoted);
        assert_eq!(
            registry.get(&"inc".into()).unwrap().status,
            StrategyStatus::Active
        );
    }

    #[test]
    fn test_demotes_negative_active_strategy() {
        let mut registry = registry_with(&[("act", StrategyStatus::Active)]);
        let mut snapshots = HashMap::new();
        snapshots.insert("act".into(), snapshot("act", -0.3, 0.40, 20));

        let actions = registry.review(&snapshots, &ReviewPolicy::default());

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].outcome, ReviewOutcome::Demoted);
        let strategy = registry.get(&"act".into()).unwrap();
        assert_eq!(strategy.status, StrategyStatus::Paused);
        assert_eq!(strategy.failed_reviews, 1);
    }

    #[test]
    fn test_does_not_promote_below_thresholds() {
        let mut registry = registry_with(&[("inc", StrategyStatus::Incubating)]);
        let mut snapshots = HashMap::new();
        // Too few trades
        snapshots.insert("inc".into(), snapshot("inc", 1.5, 0.70, 10));

        let actions = registry.review(&snapshots, &ReviewPolicy::default());
        assert!(actions.is_empty());
        assert_eq!(
            registry.get(&"inc".into()).unwrap().status,
            StrategyStatus::Incubating
        );
    }

    #[test]
    fn test_retires_after_repeated_failed_reviews() {
        let mut registry = registry_with(&[("bad", StrategyStatus::Active)]);
        let policy = ReviewPolicy {
            max_failed_reviews: 3,
            ..Default::default()
        };
        let mut snapshots = HashMap::new();
        snapshots.insert("bad".into(), snapshot("bad", -0.5, 0.35, 30));

        // Review 1: Active -> Paused
        registry.review(&snapshots, &policy);
        // Review 2: still failing while paused
        let actions = registry.review(&snapshots, &policy);
        assert!(actions.is_empty());
        // Review 3: third strike retires it
        let actions = registry.review(&snapshots, &policy);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].outcome, ReviewOutcome::Retired);
        assert_eq!(
            registry.get(&"bad".into()).unwrap().status,
            StrategyStatus::Retired
        );
    }

    #[test]
    fn test_reinstates_recovered_paused_strategy() {
        let mut registry = registry_with(&[("rec", StrategyStatus::Paused)]);
        let mut snapshots = HashMap::new();
        snapshots.insert("rec".into(), snapshot("rec", 1.4, 0.60, 25));

        let actions = registry.review(&snapshots, &ReviewPolicy::default());
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].outcome, ReviewOutcome::Reinstated);
        let strategy = registry.get(&"rec".into()).unwrap();
        assert_eq!(strategy.status, StrategyStatus::Active);
        assert_eq!(strategy.failed_reviews, 0);
    }

    #[test]
    fn test_skips_strategies_without_snapshots() {
        let mut registry = registry_with(&[("nodata", StrategyStatus::Active)]);
        let actions = registry.review(&HashMap::new(), &ReviewPolicy::default());
        assert!(actions.is_empty());
    }
}
