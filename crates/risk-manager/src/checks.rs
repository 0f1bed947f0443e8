use janus_core::{Proposal, RiskState};
use janus_ports::LeveragePosition;
use rust_decimal::Decimal;

use crate::limits::RiskLimits;

/// Machine-readable reason codes, stable across releases so downstream
/// consumers can reconstruct any verdict after the fact.
pub mod reason {
    pub const HALTED: &str = "halted";
    pub const LEVERAGE_CRITICAL: &str = "leverage_critical";
    pub const LEVERAGE_THROTTLE: &str = "leverage_warning_throttle";
    pub const DAILY_LOSS: &str = "daily_loss_limit_exceeded";
    pub const CONSECUTIVE_LOSSES: &str = "consecutive_loss_breaker";
    pub const SIZE_CLAMPED: &str = "position_size_clamped";
    pub const BELOW_MIN_VIABLE: &str = "below_min_viable_size";
    pub const ALL_CLEAR: &str = "all_checks_passed";
}

/// Outcome of one check in the chain
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    /// Approved at a reduced size; later checks see the reduced size
    Throttle { size: Decimal, code: &'static str },
    Deny { code: &'static str },
    /// Deny and latch the trading halt
    Halt { code: &'static str },
}

/// Live collaborator data the gate needs beyond the risk state
#[derive(Debug, Clone, Default)]
pub struct GateInputs {
    /// Fresh leverage snapshot, absent when the feed timed out
    pub leverage: Option<LeveragePosition>,
    /// Equity available for sizing this cycle
    pub tradable_equity: Decimal,
}

/// Check 1: leverage health
///
/// Below critical the whole book is in liquidation territory: halt.
/// Between critical and warning, new risk is cut to the throttle
/// fraction. Missing live data passes in degraded mode; the loss-based
/// checks still protect.
pub fn check_leverage_health(
    proposal: &Proposal,
    inputs: &GateInputs,
    limits: &RiskLimits,
) -> Verdict {
    let Some(position) = &inputs.leverage else {
        return Verdict::Pass;
    };

    let hf = position.health_factor;
    if hf < limits.leverage.critical {
        return Verdict::Halt {
            code: reason::LEVERAGE_CRITICAL,
        };
    }
    if hf < limits.leverage.warning && proposal.action.is_new_risk() {
        return Verdict::Throttle {
            size: proposal.size * limits.throttle_fraction,
            code: reason::LEVERAGE_THROTTLE,
        };
    }
    Verdict::Pass
}

/// Check 2: daily loss limit
///
/// Once the day's net loss reaches the configured fraction of day-start
/// equity, no new risk for the rest of the day. Exits still pass.
pub fn check_daily_loss(state: &RiskState, proposal: &Proposal, limits: &RiskLimits) -> Verdict {
    if !proposal.action.is_new_risk() {
        return Verdict::Pass;
    }
    let limit = limits.max_daily_loss_pct * state.day_start_equity;
    if state.daily_loss_total >= limit {
        return Verdict::Deny {
            code: reason::DAILY_LOSS,
        };
    }
    Verdict::Pass
}

/// Check 3: consecutive-loss circuit breaker
pub fn check_consecutive_losses(
    state: &RiskState,
    proposal: &Proposal,
    limits: &RiskLimits,
) -> Verdict {
    if !proposal.action.is_new_risk() {
        return Verdict::Pass;
    }
    if state.consecutive_losses >= limits.max_consecutive_losses {
        return Verdict::Deny {
            code: reason::CONSECUTIVE_LOSSES,
        };
    }
    Verdict::Pass
}

/// Check 4: position sizing
///
/// Oversized proposals are clamped to the cap rather than denied,
/// unless the clamped size is no longer worth executing.
pub fn check_position_size(size: Decimal, inputs: &GateInputs, limits: &RiskLimits) -> Verdict {
    let cap = limits.max_position_pct * inputs.tradable_equity;
    if size <= cap {
        return Verdict::Pass;
    }
    if cap < limits.min_viable_size {
        return Verdict::Deny {
            code: reason::BELOW_MIN_VIABLE,
        };
    }
    Verdict::Throttle {
        size: cap,
        code: reason::SIZE_CLAMPED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use janus_core::ProposedAction;
    use rust_decimal_macros::dec;

    fn proposal(action: ProposedAction, size: Decimal) -> Proposal {
        Proposal {
            strategy_id: "s1".into(),
            asset: "BTC-USD".to_string(),
            action,
            size,
            confidence: 0.8,
        }
    }

    fn leverage(hf: Decimal) -> GateInputs {
        GateInputs {
            leverage: Some(LeveragePosition {
                health_factor: hf,
                collateral_usd: dec!(10000),
                debt_usd: dec!(4000),
                liquidation_price: dec!(30000),
            }),
            tradable_equity: dec!(1000),
        }
    }

    #[test]
    fn test_leverage_bands() {
        let limits = RiskLimits::default(); // critical 1.5, warning 2.0
        let p = proposal(ProposedAction::Enter, dec!(100));

        assert_eq!(
            check_leverage_health(&p, &leverage(dec!(1.3)), &limits),
            Verdict::Halt {
                code: reason::LEVERAGE_CRITICAL
            }
        );
        assert_eq!(
            check_leverage_health(&p, &leverage(dec!(1.8)), &limits),
            Verdict::Throttle {
                size: dec!(50.0),
                code: reason::LEVERAGE_THROTTLE
            }
        );
        assert_eq!(
            check_leverage_health(&p, &leverage(dec!(2.2)), &limits),
            Verdict::Pass
        );
    }

    #[test]
    fn test_missing_leverage_data_passes_degraded() {
        let limits = RiskLimits::default();
        let inputs = GateInputs {
            leverage: None,
            tradable_equity: dec!(1000),
        };
        let p = proposal(ProposedAction::Enter, dec!(100));
        assert_eq!(check_leverage_health(&p, &inputs, &limits), Verdict::Pass);
    }

    #[test]
    fn test_daily_loss_denies_new_risk_only() {
        let limits = RiskLimits::default(); // 10%
        let mut state = RiskState::new(dec!(1000));
        state.daily_loss_total = dec!(105);

        let enter = proposal(ProposedAction::Enter, dec!(50));
        let exit = proposal(ProposedAction::Exit, dec!(50));

        assert_eq!(
            check_daily_loss(&state, &enter, &limits),
            Verdict::Deny {
                code: reason::DAILY_LOSS
            }
        );
        assert_eq!(check_daily_loss(&state, &exit, &limits), Verdict::Pass);
    }

    #[test]
    fn test_consecutive_loss_breaker() {
        let limits = RiskLimits::default(); // 3 losses
        let mut state = RiskState::new(dec!(1000));
        state.consecutive_losses = 3;

        let enter = proposal(ProposedAction::Enter, dec!(50));
        assert_eq!(
            check_consecutive_losses(&state, &enter, &limits),
            Verdict::Deny {
                code: reason::CONSECUTIVE_LOSSES
            }
        );

        state.consecutive_losses = 2;
        assert_eq!(
            check_consecutive_losses(&state, &enter, &limits),
            Verdict::Pass
        );
    }

    #[test]
    fn test_position_size_clamps_or_denies() {
        let limits = RiskLimits::default(); // cap = 10% of equity
        let inputs = GateInputs {
            leverage: None,
            tradable_equity: dec!(1000),
        };

        assert_eq!(
            check_position_size(dec!(80), &inputs, &limits),
            Verdict::Pass
        );
        assert_eq!(
            check_position_size(dec!(250), &inputs, &limits),
            Verdict::Throttle {
                size: dec!(100.0),
                code: reason::SIZE_CLAMPED
            }
        );

        // Cap below the minimum viable size: deny instead of clamping
        let tiny = GateInputs {
            leverage: None,
            tradable_equity: dec!(50),
        };
        assert_eq!(
            check_position_size(dec!(250), &tiny, &limits),
            Verdict::Deny {
                code: reason::BELOW_MIN_VIABLE
            }
        );
    }
}
