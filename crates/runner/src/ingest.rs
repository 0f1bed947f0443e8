//! Signal ingestion
//!
//! Normalizes raw scanner observations into the uniform shape the rest
//! of the pipeline consumes. Malformed ticks are dropped with a logged
//! code, never silently; duplicates collapse to the freshest observation
//! per (strategy, asset).

use std::collections::{BTreeMap, BTreeSet};

use janus_core::{SignalObservation, StrategyId};
use log::debug;
use rust_decimal::Decimal;

/// Per-cycle signal normalizer
///
/// Built fresh each cycle from the registry's current strategy set so a
/// retired strategy's signals stop flowing the cycle it retires.
pub struct SignalIngestor {
    known: BTreeSet<StrategyId>,
}

impl SignalIngestor {
    pub fn new(known: impl IntoIterator<Item = StrategyId>) -> Self {
        Self {
            known: known.into_iter().collect(),
        }
    }

    /// Validate, canonicalize and deduplicate one poll's observations.
    ///
    /// Output is sorted by (strategy, asset) so downstream gating walks
    /// proposals in a deterministic order.
    pub fn normalize(&self, raw: Vec<SignalObservation>) -> Vec<SignalObservation> {
        let mut fresh: BTreeMap<(StrategyId, String), SignalObservation> = BTreeMap::new();

        for mut observation in raw {
            if !self.known.contains(&observation.strategy_id) {
                debug!(
                    "[INGEST] Dropped signal (unknown_strategy): {}",
                    observation.strategy_id
                );
                continue;
            }
            if !(0.0..=1.0).contains(&observation.confidence) {
                debug!(
                    "[INGEST] Dropped signal (confidence_out_of_range): {} {}",
                    observation.strategy_id, observation.confidence
                );
                continue;
            }
            if observation.volume_usd <= Decimal::ZERO {
                debug!(
                    "[INGEST] Dropped signal (non_positive_volume): {} {}",
                    observation.strategy_id, observation.asset
                );
                continue;
            }
            if observation.spread < Decimal::ZERO {
                debug!(
                    "[INGEST] Dropped signal (negative_spread): {} {}",
                    observation.strategy_id, observation.asset
                );
                continue;
            }

            observation.asset = observation.asset.to_uppercase();
            let key = (observation.strategy_id.clone(), observation.asset.clone());

            match fresh.get(&key) {
                Some(existing) if existing.observed_at >= observation.observed_at => {
                    debug!(
                        "[INGEST] Dropped signal (stale_duplicate): {} {}",
                        key.0, key.1
                    );
                }
                _ => {
                    fresh.insert(key, observation);
                }
            }
        }

        fresh.into_values().collect()
    }
}
