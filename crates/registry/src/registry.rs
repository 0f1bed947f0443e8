use std::collections::BTreeMap;

use janus_core::{Strategy, StrategyId, StrategyStatus};
use log::{info, warn};
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Canonical owner of the strategy set
///
/// Strategies are held in a BTreeMap so every iteration (and therefore
/// every rebalance and gate pass over them) is deterministic. All weight
/// mutations go through the budget check: the sum of allocation weights
/// over incubating + active strategies never exceeds 1.0.
pub struct StrategyRegistry {
    strategies: BTreeMap<StrategyId, Strategy>,
    /// Maximum weight an incubating strategy may hold
    incubation_cap: Decimal,
}

impl StrategyRegistry {
    pub fn new(incubation_cap: Decimal) -> Self {
        Self {
            strategies: BTreeMap::new(),
            incubation_cap,
        }
    }

    /// Rebuild a registry from persisted strategies (state-document load)
    pub fn from_strategies(
        incubation_cap: Decimal,
        strategies: Vec<Strategy>,
    ) -> Self {
        let mut registry = Self::new(incubation_cap);
        for strategy in strategies {
            registry.strategies.insert(strategy.id.clone(), strategy);
        }
        registry
    }

    pub fn incubation_cap(&self) -> Decimal {
        self.incubation_cap
    }

    /// Register a new strategy
    ///
    /// New entrants always start incubating; any pre-set weight is clamped
    /// to the incubation cap and validated against the remaining budget.
    pub fn register(&mut self, mut strategy: Strategy) -> Result<()> {
        if self.strategies.contains_key(&strategy.id) {
            return Err(Error::DuplicateStrategy(strategy.id));
        }

        strategy.status = StrategyStatus::Incubating;
        strategy.allocation_weight = strategy
            .allocation_weight
            .clamp(Decimal::ZERO, self.incubation_cap);

        let total = self.total_allocated_weight() + strategy.allocation_weight;
        if total > Decimal::ONE {
            return Err(Error::WeightBudgetExceeded {
                total: total.to_string(),
            });
        }

        info!(
            "[REGISTRY] Registered {} ({}) weight={}",
            strategy.id, strategy.name, strategy.allocation_weight
        );
        self.strategies.insert(strategy.id.clone(), strategy);
        Ok(())
    }

    /// Apply a lifecycle transition, validating it against the state machine
    pub fn transition(&mut self, id: &StrategyId, new_status: StrategyStatus) -> Result<()> {
        let strategy = self
            .strategies
            .get_mut(id)
            .ok_or_else(|| Error::UnknownStrategy(id.clone()))?;

        if !strategy.status.can_transition_to(new_status) {
            return Err(Error::InvalidTransition {
                id: id.clone(),
                from: strategy.status,
                to: new_status,
            });
        }

        let old_status = strategy.status;
        let old_weight = strategy.allocation_weight;
        strategy.status = new_status;

        // Leaving the allocatable set releases the strategy's budget
        if !new_status.is_allocatable() {
            strategy.allocation_weight = Decimal::ZERO;
        }

        info!(
            "[REGISTRY] Transition {}: {} -> {} (weight {} -> {})",
            id, old_status, new_status, old_weight, strategy.allocation_weight
        );
        Ok(())
    }

    /// Set one strategy's allocation weight
    ///
    /// Incubating strategies are clamped to [0, incubation_cap]. Fails if
    /// the resulting total over allocatable strategies would exceed 1.0.
    pub fn set_weight(&mut self, id: &StrategyId, weight: Decimal) -> Result<()> {
        let strategy = self
            .strategies
            .get(id)
            .ok_or_else(|| Error::UnknownStrategy(id.clone()))?;

        let status = strategy.status;
        let clamped = self.clamp_for(status, weight);
        let total = self.total_allocated_weight() - strategy.allocation_weight + clamped;
        if total > Decimal::ONE {
            return Err(Error::WeightBudgetExceeded {
                total: total.to_string(),
            });
        }

        if let Some(strategy) = self.strategies.get_mut(id) {
            let old = strategy.allocation_weight;
            strategy.allocation_weight = clamped;
            info!("[REGISTRY] Weight {}: {} -> {}", id, old, clamped);
        }
        Ok(())
    }

    /// Apply a rebalance batch atomically: the whole batch is validated
    /// first, so a bad batch changes nothing.
    pub fn apply_weights(&mut self, changes: &[(StrategyId, Decimal)]) -> Result<()> {
        let mut total = self.total_allocated_weight();
        for (id, weight) in changes {
            let strategy = self
                .strategies
                .get(id)
                .ok_or_else(|| Error::UnknownStrategy(id.clone()))?;
            let clamped = self.clamp_for(strategy.status, *weight);
            total = total - strategy.allocation_weight + clamped;
        }
        if total > Decimal::ONE {
            return Err(Error::WeightBudgetExceeded {
                total: total.to_string(),
            });
        }

        for (id, weight) in changes {
            let Some(strategy) = self.strategies.get(id) else {
                continue;
            };
            let clamped = self.clamp_for(strategy.status, *weight);
            if let Some(strategy) = self.strategies.get_mut(id) {
                if strategy.allocation_weight != clamped {
                    info!(
                        "[REGISTRY] Rebalance weight {}: {} -> {}",
                        id, strategy.allocation_weight, clamped
                    );
                }
                strategy.allocation_weight = clamped;
            }
        }
        Ok(())
    }

    /// Bump the trade counter when an outcome is reconciled
    pub fn record_trade(&mut self, id: &StrategyId) {
        match self.strategies.get_mut(id) {
            Some(strategy) => strategy.trade_count += 1,
            None => warn!("[REGISTRY] Outcome for unknown strategy {}", id),
        }
    }

    pub fn get(&self, id: &StrategyId) -> Option<&Strategy> {
        self.strategies.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &StrategyId) -> Option<&mut Strategy> {
        self.strategies.get_mut(id)
    }

    /// All strategies, in deterministic id order
    pub fn all(&self) -> impl Iterator<Item = &Strategy> {
        self.strategies.values()
    }

    /// Strategies eligible for allocation (incubating + active), id order
    pub fn allocatable(&self) -> Vec<&Strategy> {
        self.strategies
            .values()
            .filter(|s| s.status.is_allocatable())
            .collect()
    }

    /// Current weight total over the allocatable set
    pub fn total_allocated_weight(&self) -> Decimal {
        self.strategies
            .values()
            .filter(|s| s.status.is_allocatable())
            .map(|s| s.allocation_weight)
            .sum()
    }

    /// Snapshot for the persisted state document
    pub fn to_strategies(&self) -> Vec<Strategy> {
        self.strategies.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    fn clamp_for(&self, status: StrategyStatus, weight: Decimal) -> Decimal {
        let weight = weight.clamp(Decimal::ZERO, Decimal::ONE);
        if status == StrategyStatus::Incubating {
            weight.min(self.incubation_cap)
        } else {
            weight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use janus_core::StrategyKind;
    use rust_decimal_macros::dec;

    fn make_strategy(id: &str) -> Strategy {
        Strategy::new(id, id.to_uppercase(), StrategyKind::Momentum, Utc::now())
    }

    fn registry_with(ids: &[&str]) -> StrategyRegistry {
        let mut registry = StrategyRegistry::new(dec!(0.05));
        for id in ids {
            registry.register(make_strategy(id)).unwrap();
        }
        registry
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let mut registry = registry_with(&["grid"]);
        let err = registry.register(make_strategy("grid")).unwrap_err();
        assert!(matches!(err, Error::DuplicateStrategy(_)));
    }

    #[test]
    fn test_register_forces_incubation_and_caps_weight() {
        let mut registry = StrategyRegistry::new(dec!(0.05));
        let mut strategy = make_strategy("grid");
        strategy.status = StrategyStatus::Active;
        strategy.allocation_weight = dec!(0.50);
        registry.register(strategy).unwrap();

        let stored = registry.get(&"grid".into()).unwrap();
        assert_eq!(stored.status, StrategyStatus::Incubating);
        assert_eq!(stored.allocation_weight, dec!(0.05));
    }

    #[test]
    fn test_transition_validates_state_machine() {
        let mut registry = registry_with(&["grid"]);
        let id: StrategyId = "grid".into();

        // Incubating -> Paused is illegal
        let err = registry
            .transition(&id, StrategyStatus::Paused)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));

        registry.transition(&id, StrategyStatus::Active).unwrap();
        registry.transition(&id, StrategyStatus::Paused).unwrap();
        registry.transition(&id, StrategyStatus::Retired).unwrap();
    }

    #[test]
    fn test_transition_out_of_allocation_zeroes_weight() {
        let mut registry = registry_with(&["grid"]);
        let id: StrategyId = "grid".into();
        registry.set_weight(&id, dec!(0.05)).unwrap();
        registry.transition(&id, StrategyStatus::Active).unwrap();
        registry.transition(&id, StrategyStatus::Paused).unwrap();

        assert_eq!(registry.get(&id).unwrap().allocation_weight, Decimal::ZERO);
        assert_eq!(registry.total_allocated_weight(), Decimal::ZERO);
    }

    #[test]
    fn test_incubating_weight_clamped_to_cap() {
        let mut registry = registry_with(&["grid"]);
        let id: StrategyId = "grid".into();
        registry.set_weight(&id, dec!(0.40)).unwrap();
        assert_eq!(registry.get(&id).unwrap().allocation_weight, dec!(0.05));
    }

    #[test]
    fn test_weight_budget_enforced() {
        let mut registry = registry_with(&["a", "b"]);
        registry.transition(&"a".into(), StrategyStatus::Active).unwrap();
        registry.transition(&"b".into(), StrategyStatus::Active).unwrap();

        registry.set_weight(&"a".into(), dec!(0.70)).unwrap();
        let err = registry.set_weight(&"b".into(), dec!(0.40)).unwrap_err();
        assert!(matches!(err, Error::WeightBudgetExceeded { .. }));

        // The failed mutation left nothing behind
        assert_eq!(registry.get(&"b".into()).unwrap().allocation_weight, Decimal::ZERO);
    }

    #[test]
    fn test_apply_weights_is_atomic() {
        let mut registry = registry_with(&["a", "b"]);
        registry.transition(&"a".into(), StrategyStatus::Active).unwrap();
        registry.transition(&"b".into(), StrategyStatus::Active).unwrap();

        let err = registry
            .apply_weights(&[("a".into(), dec!(0.60)), ("b".into(), dec!(0.50))])
            .unwrap_err();
        assert!(matches!(err, Error::WeightBudgetExceeded { .. }));
        assert_eq!(registry.total_allocated_weight(), Decimal::ZERO);

        registry
            .apply_weights(&[("a".into(), dec!(0.60)), ("b".into(), dec!(0.40))])
            .unwrap();
        assert_eq!(registry.total_allocated_weight(), dec!(1.00));
    }

    #[test]
    fn test_roundtrip_through_persisted_form() {
        let mut registry = registry_with(&["a", "b"]);
        registry.transition(&"a".into(), StrategyStatus::Active).unwrap();
        registry.set_weight(&"a".into(), dec!(0.30)).unwrap();

        let restored =
            StrategyRegistry::from_strategies(dec!(0.05), registry.to_strategies());
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.total_allocated_weight(), dec!(0.30));
        assert_eq!(
            restored.get(&"a".into()).unwrap().status,
            StrategyStatus::Active
        );
    }
}
