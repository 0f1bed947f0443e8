//! Startup configuration
//!
//! Every threshold the decision pipeline uses lives here, in one
//! validated struct. Invalid or missing values are fatal at startup and
//! never silently defaulted: trading against a half-understood
//! configuration is how limits get bypassed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use janus_registry::ReviewPolicy;
use janus_risk_manager::RiskLimits;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Single-shot or continuous scheduling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    SingleCycle,
    Continuous,
}

/// Knobs for the statistics and rebalance pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Weight cap for incubating strategies, in (0, 1)
    pub incubation_cap: Decimal,
    /// Rolling window (trade count) for snapshots and correlation
    pub snapshot_window: usize,
    /// Below this trade count a snapshot is "insufficient data"
    pub min_trades_for_snapshot: u64,
    /// Minimum overlapping observations before a correlation is defined
    pub min_overlap: usize,
}

/// Full runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub run_mode: RunMode,
    pub cycle_interval_secs: u64,
    /// UTC offset of the trading-day boundary, in whole hours
    pub day_boundary_offset_hours: i32,
    /// Rebalance runs every N cycles (plus on explicit trigger)
    pub rebalance_every_n_cycles: u32,
    pub collaborator_timeout_ms: u64,
    pub initial_equity: Decimal,
    pub state_path: PathBuf,
    pub allocation: AllocationConfig,
    pub review: ReviewPolicy,
    pub risk: RiskLimits,
}

impl RunnerConfig {
    /// Load and validate a configuration file. Any failure is fatal.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field; called by `from_file` and again by the
    /// orchestrator constructor as a last line of defense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_interval_secs == 0 {
            return Err(invalid("cycle_interval_secs", "must be positive"));
        }
        if self.rebalance_every_n_cycles == 0 {
            return Err(invalid("rebalance_every_n_cycles", "must be positive"));
        }
        if self.collaborator_timeout_ms == 0 {
            return Err(invalid("collaborator_timeout_ms", "must be positive"));
        }
        if self.initial_equity <= Decimal::ZERO {
            return Err(invalid("initial_equity", "must be positive"));
        }
        if !(-12..=14).contains(&self.day_boundary_offset_hours) {
            return Err(invalid(
                "day_boundary_offset_hours",
                "must be a real UTC offset in [-12, 14]",
            ));
        }

        let alloc = &self.allocation;
        if alloc.incubation_cap <= Decimal::ZERO || alloc.incubation_cap >= Decimal::ONE {
            return Err(invalid("allocation.incubation_cap", "must be in (0, 1)"));
        }
        if alloc.snapshot_window == 0 {
            return Err(invalid("allocation.snapshot_window", "must be positive"));
        }
        if alloc.min_trades_for_snapshot == 0 {
            return Err(invalid(
                "allocation.min_trades_for_snapshot",
                "must be positive",
            ));
        }
        if alloc.min_overlap < 2 {
            return Err(invalid(
                "allocation.min_overlap",
                "needs at least two observations",
            ));
        }

        let review = &self.review;
        if review.min_trades == 0 {
            return Err(invalid("review.min_trades", "must be positive"));
        }
        if !(0.0..=1.0).contains(&review.promotion_win_rate) {
            return Err(invalid("review.promotion_win_rate", "must be in [0, 1]"));
        }
        if review.promotion_sharpe <= review.demotion_sharpe {
            return Err(invalid(
                "review.promotion_sharpe",
                "must exceed the demotion threshold",
            ));
        }
        if review.max_failed_reviews == 0 {
            return Err(invalid("review.max_failed_reviews", "must be positive"));
        }

        let risk = &self.risk;
        if !risk.leverage.is_valid() {
            return Err(invalid(
                "risk.leverage",
                "bands must satisfy 0 < critical < warning < caution",
            ));
        }
        if risk.max_daily_loss_pct <= Decimal::ZERO || risk.max_daily_loss_pct > Decimal::ONE {
            return Err(invalid("risk.max_daily_loss_pct", "must be in (0, 1]"));
        }
        if risk.max_consecutive_losses == 0 {
            return Err(invalid("risk.max_consecutive_losses", "must be positive"));
        }
        if risk.max_position_pct <= Decimal::ZERO || risk.max_position_pct > Decimal::ONE {
            return Err(invalid("risk.max_position_pct", "must be in (0, 1]"));
        }
        if risk.min_viable_size < Decimal::ZERO {
            return Err(invalid("risk.min_viable_size", "must be non-negative"));
        }
        if risk.throttle_fraction <= Decimal::ZERO || risk.throttle_fraction >= Decimal::ONE {
            return Err(invalid("risk.throttle_fraction", "must be in (0, 1)"));
        }

        Ok(())
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Continuous,
            cycle_interval_secs: 900,
            day_boundary_offset_hours: 0,
            rebalance_every_n_cycles: 96, // daily at the 15-minute default
            collaborator_timeout_ms: 5_000,
            initial_equity: dec!(10_000),
            state_path: PathBuf::from("janus_state.json"),
            allocation: AllocationConfig {
                incubation_cap: dec!(0.05),
                snapshot_window: 50,
                min_trades_for_snapshot: 10,
                min_overlap: 10,
            },
            review: ReviewPolicy::default(),
            risk: RiskLimits::default(),
        }
    }
}
