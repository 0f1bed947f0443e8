//! Cycle orchestration
//!
//! One orchestrator instance drives cycles sequentially:
//! INGEST -> SCORE -> REBALANCE (periodic) -> GATE -> PERSIST -> EMIT.
//!
//! Crash safety: every cycle works on a buffered copy of the risk state
//! and equity; the copy is committed only after the state document has
//! been renamed into place. A cycle that dies mid-flight leaves the
//! prior persisted state untouched and is simply retried on the next
//! tick. Gate evaluation is strictly serialized; only the read-only
//! score phase fans out across tasks.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveDate};
use janus_allocation::{AllocationRebalancer, RebalanceInput};
use janus_clock::{CycleScheduler, Tick};
use janus_core::{
    Decision, DecisionId, GateResult, PerformanceSnapshot, Proposal, ProposedAction, RiskState,
    SignalObservation, Strategy, StrategyId, StrategyStatus, Timestamp,
};
use janus_performance::{CorrelationEstimator, PerformanceTracker, Recorded, SnapshotResult};
use janus_ports::{Clock, ExecutionAdapter, LeverageHealthProvider, MarketSignalSource};
use janus_registry::StrategyRegistry;
use janus_risk_manager::{GateInputs, RiskGate};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tokio::sync::{broadcast, mpsc};

use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use crate::ingest::SignalIngestor;
use crate::store::{FORMAT_VERSION, StateDocument, StateStore};

/// Operator commands handled between cycles
#[derive(Debug, Clone)]
pub enum Command {
    /// The explicit reset event: the only way out of a trading halt
    ClearHalt { operator_note: String },
    /// Run the rebalance phase on the next cycle regardless of cadence
    TriggerRebalance,
}

/// Summary of one completed cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_id: u64,
    pub decisions: Vec<Decision>,
    pub rebalanced: bool,
    /// True when a collaborator timed out and coverage was reduced
    pub degraded: bool,
}

/// The top-level cycle driver
pub struct CycleOrchestrator {
    config: RunnerConfig,
    clock: Arc<dyn Clock>,
    signals: Arc<dyn MarketSignalSource>,
    leverage: Arc<dyn LeverageHealthProvider>,
    execution: Arc<dyn ExecutionAdapter>,

    registry: StrategyRegistry,
    tracker: Arc<PerformanceTracker>,
    estimator: CorrelationEstimator,
    rebalancer: AllocationRebalancer,
    gate: RiskGate,
    store: StateStore,

    // Committed state; mutated only after a successful persist
    risk_state: RiskState,
    equity: Decimal,
    cycle_id: u64,
    day_bucket: Option<NaiveDate>,

    // Operator flags applied at the next cycle boundary
    pending_halt_clear: bool,
    pending_rebalance: bool,

    /// Approved decisions the venue has not acknowledged yet
    pending_acks: HashSet<DecisionId>,
    decision_tx: broadcast::Sender<Decision>,
}

impl CycleOrchestrator {
    /// Build an orchestrator, restoring committed state from the store
    /// when a previous run left a document behind.
    pub fn new(
        config: RunnerConfig,
        clock: Arc<dyn Clock>,
        signals: Arc<dyn MarketSignalSource>,
        leverage: Arc<dyn LeverageHealthProvider>,
        execution: Arc<dyn ExecutionAdapter>,
    ) -> Result<Self> {
        let store = StateStore::new(&config.state_path);
        let restored = store.load()?;

        let (registry, risk_state, equity, cycle_id, day_bucket) = match restored {
            Some(document) => {
                info!(
                    "[CYCLE] Restored state from cycle {} ({} strategies)",
                    document.cycle_id,
                    document.strategies.len()
                );
                (
                    StrategyRegistry::from_strategies(
                        config.allocation.incubation_cap,
                        document.strategies,
                    ),
                    document.risk_state,
                    document.equity,
                    document.cycle_id,
                    document.day_bucket,
                )
            }
            None => {
                info!("[CYCLE] No previous state, starting fresh");
                (
                    StrategyRegistry::new(config.allocation.incubation_cap),
                    RiskState::new(config.initial_equity),
                    config.initial_equity,
                    0,
                    None,
                )
            }
        };

        let tracker = Arc::new(PerformanceTracker::new(
            config.allocation.min_trades_for_snapshot,
        ));
        let estimator = CorrelationEstimator::new(config.allocation.min_overlap);
        let rebalancer = AllocationRebalancer::new(config.allocation.incubation_cap);
        let gate = RiskGate::new(config.risk.clone());
        let (decision_tx, _) = broadcast::channel(1024);

        Ok(Self {
            config,
            clock,
            signals,
            leverage,
            execution,
            registry,
            tracker,
            estimator,
            rebalancer,
            gate,
            store,
            risk_state,
            equity,
            cycle_id,
            day_bucket,
            pending_halt_clear: false,
            pending_rebalance: false,
            pending_acks: HashSet::new(),
            decision_tx,
        })
    }

    /// Register a strategy into the managed set
    pub fn register_strategy(&mut self, strategy: Strategy) -> Result<()> {
        self.registry.register(strategy)?;
        Ok(())
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> Arc<PerformanceTracker> {
        Arc::clone(&self.tracker)
    }

    pub fn risk_state(&self) -> &RiskState {
        &self.risk_state
    }

    pub fn equity(&self) -> Decimal {
        self.equity
    }

    pub fn cycle_id(&self) -> u64 {
        self.cycle_id
    }

    /// Read-only decision stream for dashboards/loggers
    pub fn subscribe_decisions(&self) -> broadcast::Receiver<Decision> {
        self.decision_tx.subscribe()
    }

    /// Queue an operator command for the next cycle boundary
    pub fn apply_command(&mut self, command: Command) {
        match command {
            Command::ClearHalt { operator_note } => {
                info!("[CYCLE] Halt reset requested: {}", operator_note);
                self.pending_halt_clear = true;
            }
            Command::TriggerRebalance => {
                info!("[CYCLE] Rebalance trigger requested");
                self.pending_rebalance = true;
            }
        }
    }

    /// Run the orchestrator under a scheduler until shutdown.
    ///
    /// Persistence failures are fatal: trading never proceeds against
    /// possibly-corrupted state. Collaborator timeouts are not.
    pub async fn run(
        mut self,
        mut scheduler: CycleScheduler,
        mut commands: mpsc::Receiver<Command>,
    ) -> Result<()> {
        info!(
            "[CYCLE] Orchestrator running, interval {:?}",
            self.config.cycle_interval()
        );
        loop {
            match scheduler.tick().await {
                Tick::Shutdown => {
                    info!("[CYCLE] Shutdown; uncommitted cycle state discarded");
                    return Ok(());
                }
                Tick::Fire => {
                    while let Ok(command) = commands.try_recv() {
                        self.apply_command(command);
                    }
                    match self.run_cycle().await {
                        Ok(report) => {
                            info!(
                                "[CYCLE] {} complete: {} decisions, rebalanced={}, degraded={}",
                                report.cycle_id,
                                report.decisions.len(),
                                report.rebalanced,
                                report.degraded
                            );
                        }
                        Err(err) => {
                            error!("[CYCLE] Fatal: {}", err);
                            return Err(err);
                        }
                    }
                }
            }
        }
    }

    /// Execute exactly one cycle against the committed state.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let cycle_id = self.cycle_id + 1;
        let now = self.clock.now();
        let mut degraded = false;

        if !self.pending_acks.is_empty() {
            debug!(
                "[CYCLE] {} starting with {} unacknowledged decisions",
                cycle_id,
                self.pending_acks.len()
            );
        }

        // The cycle's buffer: committed only at the persist boundary
        let mut working_state = self.risk_state.clone();
        let mut working_equity = self.equity;

        if self.pending_halt_clear {
            working_state.clear_halt();
            self.pending_halt_clear = false;
            info!("[CYCLE] {} halt cleared by operator reset", cycle_id);
        }

        // ---- INGEST ----
        match self.execution.poll_fills().await {
            Ok(fills) => {
                for outcome in fills {
                    if self.tracker.record(outcome.clone()) == Recorded::Inserted {
                        self.registry.record_trade(&outcome.strategy_id);
                        working_state.apply_outcome(&outcome);
                        working_equity += outcome.realized_pnl;
                    }
                }
            }
            Err(err) => {
                warn!("[CYCLE] {} fills unavailable: {}", cycle_id, err);
                degraded = true;
            }
        }

        let bucket = day_bucket_for(now, self.config.day_boundary_offset_hours);
        let working_day_bucket = Some(bucket);
        if let Some(previous) = self.day_bucket
            && previous != bucket
        {
            info!(
                "[CYCLE] {} day boundary {} -> {}, rolling daily counters",
                cycle_id, previous, bucket
            );
            working_state.roll_day(working_equity);
        }

        let raw_signals = match self
            .signals
            .poll_signals(self.config.collaborator_timeout())
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "[CYCLE] {} signals unavailable, proceeding degraded: {}",
                    cycle_id, err
                );
                degraded = true;
                Vec::new()
            }
        };
        let ingestor = SignalIngestor::new(self.registry.all().map(|s| s.id.clone()));
        let signals = ingestor.normalize(raw_signals);

        let leverage_position = match self
            .leverage
            .fetch_position(self.config.collaborator_timeout())
            .await
        {
            Ok(position) => Some(position),
            Err(err) => {
                warn!(
                    "[CYCLE] {} leverage feed unavailable, proceeding degraded: {}",
                    cycle_id, err
                );
                degraded = true;
                None
            }
        };

        // ---- SCORE ----
        let snapshots = self.score_phase(now).await;

        // ---- REBALANCE ----
        let due = cycle_id % u64::from(self.config.rebalance_every_n_cycles) == 0;
        let rebalanced = if due || self.pending_rebalance {
            self.pending_rebalance = false;
            self.rebalance_phase(&snapshots, now)?;
            true
        } else {
            false
        };

        // ---- GATE ----
        let decisions = self.gate_phase(
            &signals,
            &mut working_state,
            working_equity,
            leverage_position,
            cycle_id,
            now,
        );

        // ---- PERSIST ----
        let mut latest_snapshots: Vec<PerformanceSnapshot> = snapshots.values().cloned().collect();
        latest_snapshots.sort_by(|a, b| a.strategy_id.cmp(&b.strategy_id));

        let document = StateDocument {
            format_version: FORMAT_VERSION,
            cycle_id,
            saved_at: now,
            day_bucket: working_day_bucket,
            equity: working_equity,
            strategies: self.registry.to_strategies(),
            risk_state: working_state.clone(),
            latest_snapshots,
        };
        if let Err(err) = self.store.save(&document) {
            error!(
                "[CYCLE] {} persist failed, discarding cycle output: {}",
                cycle_id, err
            );
            return Err(Error::Persistence(err));
        }

        // Commit the buffered state only now
        self.risk_state = working_state;
        self.equity = working_equity;
        self.cycle_id = cycle_id;
        self.day_bucket = working_day_bucket;

        // ---- EMIT ----
        self.emit_phase(&decisions).await;

        Ok(CycleReport {
            cycle_id,
            decisions,
            rebalanced,
            degraded,
        })
    }

    /// Fan snapshot computation out across tasks; history is append-only
    /// so concurrent reads are safe.
    async fn score_phase(&self, now: Timestamp) -> HashMap<StrategyId, PerformanceSnapshot> {
        let window = self.config.allocation.snapshot_window;
        let mut handles = Vec::new();
        for strategy in self.registry.all() {
            if strategy.status == StrategyStatus::Retired {
                continue;
            }
            let id = strategy.id.clone();
            let tracker = Arc::clone(&self.tracker);
            handles.push((
                id.clone(),
                tokio::spawn(async move { tracker.snapshot(&id, window, now) }),
            ));
        }

        let mut snapshots = HashMap::new();
        for (id, handle) in handles {
            match handle.await {
                Ok(SnapshotResult::Ready(snapshot)) => {
                    snapshots.insert(id, snapshot);
                }
                Ok(SnapshotResult::InsufficientData { have, need }) => {
                    debug!("[CYCLE] {} has {}/{} trades, no snapshot", id, have, need);
                }
                Err(err) => {
                    warn!("[CYCLE] Score task for {} failed: {}", id, err);
                }
            }
        }
        snapshots
    }

    /// Review the lifecycle, recompute correlations and apply the new
    /// weight batch atomically.
    fn rebalance_phase(
        &mut self,
        snapshots: &HashMap<StrategyId, PerformanceSnapshot>,
        now: Timestamp,
    ) -> Result<()> {
        let actions = self.registry.review(snapshots, &self.config.review);
        for action in &actions {
            info!(
                "[CYCLE] Review action for {}: {:?} ({})",
                action.strategy_id, action.outcome, action.reason
            );
        }

        let allocatable_ids: Vec<StrategyId> = self
            .registry
            .allocatable()
            .iter()
            .map(|s| s.id.clone())
            .collect();
        let matrix = self.estimator.matrix(
            &self.tracker,
            &allocatable_ids,
            self.config.allocation.snapshot_window,
            now,
        );

        let inputs: Vec<RebalanceInput> = self
            .registry
            .allocatable()
            .into_iter()
            .map(|strategy| RebalanceInput {
                strategy_id: strategy.id.clone(),
                status: strategy.status,
                inception_time: strategy.inception_time,
                current_weight: strategy.allocation_weight,
                snapshot: snapshots.get(&strategy.id).cloned(),
                mean_correlation: matrix.mean_against(&strategy.id, &allocatable_ids),
            })
            .collect();

        let changes = self.rebalancer.rebalance(&inputs);
        let batch: Vec<(StrategyId, Decimal)> = changes
            .iter()
            .map(|c| (c.strategy_id.clone(), c.new_weight))
            .collect();
        self.registry.apply_weights(&batch)?;
        Ok(())
    }

    /// Serialized gate evaluation: one proposal at a time against the
    /// cycle's working state.
    fn gate_phase(
        &self,
        signals: &[SignalObservation],
        working_state: &mut RiskState,
        working_equity: Decimal,
        leverage_position: Option<janus_ports::LeveragePosition>,
        cycle_id: u64,
        now: Timestamp,
    ) -> Vec<Decision> {
        let inputs = GateInputs {
            leverage: leverage_position,
            tradable_equity: working_equity,
        };

        let mut decisions = Vec::new();
        for signal in signals {
            let Some(strategy) = self.registry.get(&signal.strategy_id) else {
                continue;
            };
            if !strategy.status.is_allocatable() || strategy.allocation_weight <= Decimal::ZERO {
                debug!(
                    "[CYCLE] {} skipping {}: no allocation",
                    cycle_id, signal.strategy_id
                );
                continue;
            }

            let confidence = Decimal::from_f64(signal.confidence).unwrap_or(Decimal::ZERO);
            let size = (strategy.allocation_weight * working_equity * confidence)
                .round_dp(2);
            if size <= Decimal::ZERO {
                continue;
            }

            let proposal = Proposal {
                strategy_id: signal.strategy_id.clone(),
                asset: signal.asset.clone(),
                action: ProposedAction::Enter,
                size,
                confidence: signal.confidence,
            };
            decisions.push(self.gate.evaluate(working_state, &proposal, &inputs, cycle_id, now));
        }
        decisions
    }

    /// Publish every decision; hand approved ones to the venue. A missing
    /// acknowledgement leaves the decision pending for reconciliation.
    async fn emit_phase(&mut self, decisions: &[Decision]) {
        for decision in decisions {
            let _ = self.decision_tx.send(decision.clone());

            if decision.gate_result == GateResult::Rejected {
                continue;
            }
            match self.execution.submit(decision).await {
                Ok(ack) => {
                    self.pending_acks.remove(&decision.id);
                    debug!(
                        "[CYCLE] Decision {} acknowledged at {}",
                        decision.id, ack.accepted_at
                    );
                }
                Err(err) => {
                    warn!(
                        "[CYCLE] Decision {} unacknowledged, pending reconciliation: {}",
                        decision.id, err
                    );
                    self.pending_acks.insert(decision.id);
                }
            }
        }
    }
}

/// Trading-day bucket for a timestamp under the configured UTC offset
fn day_bucket_for(now: Timestamp, offset_hours: i32) -> NaiveDate {
    (now + ChronoDuration::hours(i64::from(offset_hours))).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_day_bucket_respects_offset() {
        // 23:30 UTC on Jan 1 is already Jan 2 at UTC+2
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        assert_eq!(
            day_bucket_for(t, 0),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            day_bucket_for(t, 2),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        // And still Jan 1 at UTC-5
        assert_eq!(
            day_bucket_for(t, -5),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }
}
