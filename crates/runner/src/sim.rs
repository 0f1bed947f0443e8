//! Simulated collaborators
//!
//! Seedable stand-ins for the external scanner, leverage feed and
//! execution venue. Used by the demo mode and the integration tests so
//! the full pipeline can run with no real exchange attached. None of the
//! decision logic lives here.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use janus_core::{Decision, SignalObservation, StrategyId, Symbol, TradeOutcome};
use janus_ports::{
    Clock, ExecutionAck, ExecutionAdapter, LeverageHealthProvider, LeveragePosition,
    MarketSignalSource, PortError, PortResult,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;

/// Generates one observation per configured (strategy, asset) per poll
pub struct SimulatedSignalSource {
    pairs: Vec<(StrategyId, Symbol)>,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl SimulatedSignalSource {
    pub fn new(pairs: Vec<(StrategyId, Symbol)>, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self {
            pairs,
            clock,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl MarketSignalSource for SimulatedSignalSource {
    async fn poll_signals(&self, _timeout: Duration) -> PortResult<Vec<SignalObservation>> {
        let now = self.clock.now();
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| PortError::Unavailable("signal rng poisoned".to_string()))?;

        let observations = self
            .pairs
            .iter()
            .map(|(strategy_id, asset)| SignalObservation {
                strategy_id: strategy_id.clone(),
                asset: asset.clone(),
                spread: Decimal::from_f64(rng.gen_range(0.0005..0.005))
                    .unwrap_or(dec!(0.001)),
                volume_usd: Decimal::from_f64(rng.gen_range(50_000.0..500_000.0))
                    .unwrap_or(dec!(100_000)),
                confidence: rng.gen_range(0.30..0.95),
                observed_at: now,
            })
            .collect();
        Ok(observations)
    }
}

/// Scriptable leverage feed
///
/// Pops one health factor per fetch from the script, then falls back to
/// the default. Lets tests walk the position through warning and
/// critical bands deterministically.
pub struct SimulatedLeverageFeed {
    script: Mutex<VecDeque<Decimal>>,
    default_health: Decimal,
}

impl SimulatedLeverageFeed {
    pub fn healthy(default_health: Decimal) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_health,
        }
    }

    pub fn with_script(default_health: Decimal, script: Vec<Decimal>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            default_health,
        }
    }
}

#[async_trait]
impl LeverageHealthProvider for SimulatedLeverageFeed {
    async fn fetch_position(&self, _timeout: Duration) -> PortResult<LeveragePosition> {
        let health_factor = self
            .script
            .lock()
            .map_err(|_| PortError::Unavailable("leverage script poisoned".to_string()))?
            .pop_front()
            .unwrap_or(self.default_health);

        // Derived book values consistent with the health factor
        let debt_usd = dec!(4_000);
        Ok(LeveragePosition {
            health_factor,
            collateral_usd: debt_usd * health_factor,
            debt_usd,
            liquidation_price: dec!(1_800),
        })
    }
}

/// Execution venue that fills every submitted decision on a later poll
pub struct SimulatedExecution {
    clock: Arc<dyn Clock>,
    win_probability: f64,
    rng: Mutex<StdRng>,
    queue: Mutex<VecDeque<TradeOutcome>>,
}

impl SimulatedExecution {
    pub fn new(clock: Arc<dyn Clock>, win_probability: f64, seed: u64) -> Self {
        Self {
            clock,
            win_probability,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl ExecutionAdapter for SimulatedExecution {
    async fn submit(&self, decision: &Decision) -> PortResult<ExecutionAck> {
        let now = self.clock.now();
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| PortError::Unavailable("execution rng poisoned".to_string()))?;

        let win = rng.gen_bool(self.win_probability);
        let magnitude = rng.gen_range(0.005..0.03);
        let pnl = decision.size
            * Decimal::from_f64(if win { magnitude } else { -magnitude })
                .unwrap_or(Decimal::ZERO);

        self.queue
            .lock()
            .map_err(|_| PortError::Unavailable("execution queue poisoned".to_string()))?
            .push_back(TradeOutcome::new(
                decision.strategy_id.clone(),
                now,
                pnl.round_dp(2),
            ));

        Ok(ExecutionAck {
            decision_id: decision.id,
            accepted_at: now,
        })
    }

    async fn poll_fills(&self) -> PortResult<Vec<TradeOutcome>> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| PortError::Unavailable("execution queue poisoned".to_string()))?;
        Ok(queue.drain(..).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use janus_clock::ManualClock;
    use janus_core::{GateResult, ProposedAction};
    use uuid::Uuid;

    fn decision(size: Decimal) -> Decision {
        Decision {
            id: Uuid::new_v4(),
            cycle_id: 1,
            strategy_id: "s1".into(),
            asset: "BTC-USD".to_string(),
            action: ProposedAction::Enter,
            size,
            gate_result: GateResult::Approved,
            reason: "all_checks_passed".to_string(),
            decided_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_signal_source_emits_one_per_pair() {
        let clock = Arc::new(ManualClock::new());
        let source = SimulatedSignalSource::new(
            vec![("a".into(), "BTC-USD".to_string()), ("b".into(), "ETH-USD".to_string())],
            clock,
            42,
        );
        let signals = source.poll_signals(Duration::from_secs(1)).await.unwrap();
        assert_eq!(signals.len(), 2);
        assert!(signals.iter().all(|s| (0.0..=1.0).contains(&s.confidence)));
    }

    #[tokio::test]
    async fn test_leverage_script_then_default() {
        let feed = SimulatedLeverageFeed::with_script(dec!(2.8), vec![dec!(1.3)]);
        let first = feed.fetch_position(Duration::from_secs(1)).await.unwrap();
        assert_eq!(first.health_factor, dec!(1.3));
        let second = feed.fetch_position(Duration::from_secs(1)).await.unwrap();
        assert_eq!(second.health_factor, dec!(2.8));
    }

    #[tokio::test]
    async fn test_execution_fills_arrive_on_poll() {
        let clock = Arc::new(ManualClock::new());
        let venue = SimulatedExecution::new(clock, 1.0, 7);

        venue.submit(&decision(dec!(100))).await.unwrap();
        let fills = venue.poll_fills().await.unwrap();
        assert_eq!(fills.len(), 1);
        assert!(fills[0].win);

        // Queue drains
        assert!(venue.poll_fills().await.unwrap().is_empty());
    }
}
