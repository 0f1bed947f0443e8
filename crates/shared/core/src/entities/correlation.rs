use std::collections::HashMap;

use super::StrategyId;
use crate::values::Timestamp;

/// Symmetric pairwise return correlation across active strategies
///
/// Entries exist only for pairs with enough overlapping observations;
/// a missing pair means the correlation is undefined and downstream
/// scoring assumes 0 (no diversification credit). Recomputed once per
/// rebalance cycle; never persisted.
#[derive(Debug, Clone, Default)]
pub struct CorrelationMatrix {
    pub as_of: Option<Timestamp>,
    entries: HashMap<(StrategyId, StrategyId), f64>,
}

impl CorrelationMatrix {
    pub fn new(as_of: Timestamp) -> Self {
        Self {
            as_of: Some(as_of),
            entries: HashMap::new(),
        }
    }

    /// Insert a pairwise correlation. The key is stored in canonical
    /// (ordered) form so `set(a, b)` and `set(b, a)` are the same entry.
    pub fn set(&mut self, a: &StrategyId, b: &StrategyId, rho: f64) {
        if a == b {
            return;
        }
        self.entries.insert(Self::pair_key(a, b), rho);
    }

    /// Pairwise correlation, 1.0 on the diagonal, None when undefined
    pub fn get(&self, a: &StrategyId, b: &StrategyId) -> Option<f64> {
        if a == b {
            return Some(1.0);
        }
        self.entries.get(&Self::pair_key(a, b)).copied()
    }

    /// Mean correlation of `id` against `others`, counting undefined
    /// pairs as 0.0. Returns 0.0 when `others` is empty.
    pub fn mean_against(&self, id: &StrategyId, others: &[StrategyId]) -> f64 {
        let peers: Vec<&StrategyId> = others.iter().filter(|o| *o != id).collect();
        if peers.is_empty() {
            return 0.0;
        }
        let sum: f64 = peers
            .iter()
            .map(|other| self.get(id, other).unwrap_or(0.0))
            .sum();
        sum / peers.len() as f64
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn pair_key(a: &StrategyId, b: &StrategyId) -> (StrategyId, StrategyId) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_diagonal_is_one() {
        let m = CorrelationMatrix::new(Utc::now());
        let a = StrategyId::new("a");
        assert_eq!(m.get(&a, &a), Some(1.0));
    }

    #[test]
    fn test_symmetric_storage() {
        let mut m = CorrelationMatrix::new(Utc::now());
        let a = StrategyId::new("a");
        let b = StrategyId::new("b");
        m.set(&a, &b, 0.4);
        assert_eq!(m.get(&b, &a), Some(0.4));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_undefined_pair_is_none() {
        let m = CorrelationMatrix::new(Utc::now());
        assert_eq!(m.get(&StrategyId::new("a"), &StrategyId::new("b")), None);
    }

    #[test]
    fn test_mean_counts_undefined_as_zero() {
        let mut m = CorrelationMatrix::new(Utc::now());
        let a = StrategyId::new("a");
        let b = StrategyId::new("b");
        let c = StrategyId::new("c");
        m.set(&a, &b, 0.6);
        // a-c undefined -> 0.0, so mean = (0.6 + 0.0) / 2
        let mean = m.mean_against(&a, &[b, c]);
        assert!((mean - 0.3).abs() < 1e-12);
    }
}
