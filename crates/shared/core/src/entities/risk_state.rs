use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TradeOutcome;

/// Live loss-accumulation and leverage-health state
///
/// Single mutable object, owned by the risk gate. The orchestrator works
/// on a buffered copy per cycle and commits it only when the cycle's state
/// document is persisted, so an aborted cycle leaves no partial mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskState {
    /// Losing trades in a row; reset by any win or the day roll
    pub consecutive_losses: u32,
    /// Net realized loss since the day boundary, floored at zero
    pub daily_loss_total: Decimal,
    /// Equity captured at the last day boundary
    pub day_start_equity: Decimal,
    /// Latest health factor from the leverage feed, if fresh data exists
    pub leverage_health_factor: Option<Decimal>,
    pub trading_halted: bool,
    pub halt_reason: Option<String>,
}

impl RiskState {
    pub fn new(day_start_equity: Decimal) -> Self {
        Self {
            consecutive_losses: 0,
            daily_loss_total: Decimal::ZERO,
            day_start_equity,
            leverage_health_factor: None,
            trading_halted: false,
            halt_reason: None,
        }
    }

    /// Fold one realized outcome into the loss counters.
    ///
    /// A win resets the consecutive-loss streak; a loss increments it by
    /// exactly one. The daily loss total is net of wins but never negative.
    pub fn apply_outcome(&mut self, outcome: &TradeOutcome) {
        if outcome.win {
            self.consecutive_losses = 0;
        } else {
            self.consecutive_losses += 1;
        }
        self.daily_loss_total =
            (self.daily_loss_total - outcome.realized_pnl).max(Decimal::ZERO);
    }

    /// Day-boundary reset: clears the daily counters and re-anchors the
    /// equity baseline. A halt survives the roll; only an explicit reset
    /// clears it.
    pub fn roll_day(&mut self, new_equity: Decimal) {
        self.consecutive_losses = 0;
        self.daily_loss_total = Decimal::ZERO;
        self.day_start_equity = new_equity;
    }

    /// Latch the halt flag. The first reason wins until cleared.
    pub fn halt(&mut self, reason: impl Into<String>) {
        if !self.trading_halted {
            self.trading_halted = true;
            self.halt_reason = Some(reason.into());
        }
    }

    /// Explicit reset event: the only path out of a halt
    pub fn clear_halt(&mut self) {
        self.trading_halted = false;
        self.halt_reason = None;
    }
}
