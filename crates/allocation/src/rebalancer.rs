use janus_core::{PerformanceSnapshot, StrategyId, StrategyStatus, Timestamp};
use log::{debug, info};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Per-strategy input to one rebalance pass
#[derive(Debug, Clone)]
pub struct RebalanceInput {
    pub strategy_id: StrategyId,
    pub status: StrategyStatus,
    pub inception_time: Timestamp,
    pub current_weight: Decimal,
    /// Latest snapshot, or None when the tracker reported insufficient data
    pub snapshot: Option<PerformanceSnapshot>,
    /// Mean pairwise correlation against the other allocatable strategies,
    /// with undefined pairs counted as 0
    pub mean_correlation: f64,
}

/// One weight mutation produced by a rebalance
#[derive(Debug, Clone, PartialEq)]
pub struct WeightChange {
    pub strategy_id: StrategyId,
    pub old_weight: Decimal,
    pub new_weight: Decimal,
    pub score: f64,
}

/// Score-proportional allocator
///
/// Incubating strategies are funded first at the fixed incubation cap;
/// the remaining budget is split across active strategies proportionally
/// to `max(sharpe, 0) * (1 - mean_correlation) * win_rate`. A negative or
/// zero sharpe scores 0 (demotion is the registry's concern, not ours),
/// as does a strategy without enough data for a snapshot.
pub struct AllocationRebalancer {
    incubation_cap: Decimal,
}

impl AllocationRebalancer {
    pub fn new(incubation_cap: Decimal) -> Self {
        Self { incubation_cap }
    }

    /// Compute the score of one candidate
    fn score(input: &RebalanceInput) -> f64 {
        let Some(snapshot) = &input.snapshot else {
            return 0.0;
        };
        let sharpe = snapshot.sharpe.max(0.0);
        sharpe * (1.0 - input.mean_correlation) * snapshot.win_rate
    }

    /// Recompute weights for the allocatable set.
    ///
    /// Returns one change per input, including unchanged weights, so the
    /// registry can apply the batch atomically.
    pub fn rebalance(&self, inputs: &[RebalanceInput]) -> Vec<WeightChange> {
        let mut candidates: Vec<(&RebalanceInput, f64)> = inputs
            .iter()
            .filter(|i| i.status.is_allocatable())
            .map(|i| (i, Self::score(i)))
            .collect();

        // Deterministic order: best score first, ties broken by lower
        // drawdown, then earlier inception, then id.
        candidates.sort_by(|(a, score_a), (b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let dd_a = a.snapshot.as_ref().map(|s| s.max_drawdown);
                    let dd_b = b.snapshot.as_ref().map(|s| s.max_drawdown);
                    dd_a.cmp(&dd_b)
                })
                .then_with(|| a.inception_time.cmp(&b.inception_time))
                .then_with(|| a.strategy_id.cmp(&b.strategy_id))
        });

        // Incubating strategies take the capped weight off the top; the
        // cap is honored before any score-based distribution.
        let mut budget = Decimal::ONE;
        let mut incubating_weights: Vec<(StrategyId, Decimal)> = Vec::new();
        for (input, _) in candidates
            .iter()
            .filter(|(i, _)| i.status == StrategyStatus::Incubating)
        {
            let weight = self.incubation_cap.min(budget);
            budget -= weight;
            incubating_weights.push((input.strategy_id.clone(), weight));
        }

        let active_score_total: f64 = candidates
            .iter()
            .filter(|(i, _)| i.status == StrategyStatus::Active)
            .map(|(_, score)| score)
            .sum();
        let remainder = budget;

        let mut changes = Vec::with_capacity(candidates.len());
        for (input, score) in candidates {
            let new_weight = match input.status {
                StrategyStatus::Incubating => incubating_weights
                    .iter()
                    .find(|(id, _)| id == &input.strategy_id)
                    .map(|(_, w)| *w)
                    .unwrap_or(Decimal::ZERO),
                StrategyStatus::Active if score > 0.0 && active_score_total > 0.0 => {
                    let share = score / active_score_total;
                    let exact = remainder_to_f64(remainder) * share;
                    Decimal::from_f64(exact)
                        .unwrap_or(Decimal::ZERO)
                        .round_dp_with_strategy(6, RoundingStrategy::ToZero)
                }
                _ => Decimal::ZERO,
            };

            debug!(
                "[ALLOC] {} score={:.4} weight {} -> {}",
                input.strategy_id, score, input.current_weight, new_weight
            );
            changes.push(WeightChange {
                strategy_id: input.strategy_id.clone(),
                old_weight: input.current_weight,
                new_weight,
                score,
            });
        }

        let total: Decimal = changes.iter().map(|c| c.new_weight).sum();
        info!(
            "[ALLOC] Rebalanced {} strategies, total weight {}",
            changes.len(),
            total
        );
        changes
    }
}

fn remainder_to_f64(remainder: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    remainder.to_f64().unwrap_or(0.0)
}
