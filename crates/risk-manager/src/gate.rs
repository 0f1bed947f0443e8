use janus_core::{Decision, GateResult, Proposal, RiskState, Timestamp};
use log::{info, warn};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::checks::{
    GateInputs, Verdict, check_consecutive_losses, check_daily_loss, check_leverage_health,
    check_position_size, reason,
};
use crate::limits::RiskLimits;

/// The composed gate chain
///
/// Evaluation is strictly serialized by the orchestrator: one proposal at
/// a time against one working `RiskState`, so loss counters and the halt
/// flag can never be raced or double-counted. The working state is the
/// cycle's buffer; the orchestrator commits it at the persist boundary.
pub struct RiskGate {
    limits: RiskLimits,
}

impl RiskGate {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Run one proposal through the chain and return the composite
    /// decision. Mutates only `state` (halt latch, live health factor).
    pub fn evaluate(
        &self,
        state: &mut RiskState,
        proposal: &Proposal,
        inputs: &GateInputs,
        cycle_id: u64,
        now: Timestamp,
    ) -> Decision {
        if let Some(position) = &inputs.leverage {
            state.leverage_health_factor = Some(position.health_factor);
            if position.health_factor >= self.limits.leverage.warning
                && position.health_factor < self.limits.leverage.caution
            {
                info!(
                    "[RISK] Health factor {} in caution band during cycle {}",
                    position.health_factor, cycle_id
                );
            }
        }

        // An active halt wins before any check runs
        if state.trading_halted {
            return decide(
                proposal,
                cycle_id,
                now,
                proposal.size,
                GateResult::Rejected,
                reason::HALTED,
            );
        }

        let mut size = proposal.size;
        let mut throttle_code: Option<&'static str> = None;

        let chain = [
            check_leverage_health(proposal, inputs, &self.limits),
            check_daily_loss(state, proposal, &self.limits),
            check_consecutive_losses(state, proposal, &self.limits),
        ];
        for verdict in chain {
            match verdict {
                Verdict::Pass => {}
                Verdict::Throttle { size: reduced, code } => {
                    size = reduced;
                    throttle_code = Some(code);
                }
                Verdict::Deny { code } => {
                    return decide(
                        proposal,
                        cycle_id,
                        now,
                        proposal.size,
                        GateResult::Rejected,
                        code,
                    );
                }
                Verdict::Halt { code } => {
                    state.halt(code);
                    warn!("[RISK] Trading halted during cycle {}: {}", cycle_id, code);
                    return decide(
                        proposal,
                        cycle_id,
                        now,
                        proposal.size,
                        GateResult::Rejected,
                        code,
                    );
                }
            }
        }

        // Sizing runs last, over whatever size survived the chain
        match check_position_size(size, inputs, &self.limits) {
            Verdict::Pass => {}
            Verdict::Throttle { size: reduced, code } => {
                size = reduced;
                throttle_code = Some(code);
            }
            Verdict::Deny { code } | Verdict::Halt { code } => {
                return decide(
                    proposal,
                    cycle_id,
                    now,
                    proposal.size,
                    GateResult::Rejected,
                    code,
                );
            }
        }

        match throttle_code {
            Some(code) => {
                info!(
                    "[RISK] Throttled {} {} to {} ({})",
                    proposal.strategy_id, proposal.asset, size, code
                );
                decide(proposal, cycle_id, now, size, GateResult::Throttled, code)
            }
            None => decide(
                proposal,
                cycle_id,
                now,
                size,
                GateResult::Approved,
                reason::ALL_CLEAR,
            ),
        }
    }
}

fn decide(
    proposal: &Proposal,
    cycle_id: u64,
    now: Timestamp,
    size: Decimal,
    gate_result: GateResult,
    code: &str,
) -> Decision {
    if gate_result == GateResult::Rejected {
        info!(
            "[RISK] Rejected {} {} ({})",
            proposal.strategy_id, proposal.asset, code
        );
    }
    Decision {
        id: Uuid::new_v4(),
        cycle_id,
        strategy_id: proposal.strategy_id.clone(),
        asset: proposal.asset.clone(),
        action: proposal.action,
        size,
        gate_result,
        reason: code.to_string(),
        decided_at: now,
    }
}
