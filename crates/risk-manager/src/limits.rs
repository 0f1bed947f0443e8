use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Health-factor severity bands for the leveraged lending position
///
/// Must satisfy `critical < warning < caution`. Below `critical` trading
/// halts outright; between `critical` and `warning` new risk is throttled;
/// everything at or above `warning` passes (the warning..caution band is
/// merely logged). Source systems disagree on canonical values, so these
/// are configuration inputs, not constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverageThresholds {
    pub caution: Decimal,
    pub warning: Decimal,
    pub critical: Decimal,
}

impl Default for LeverageThresholds {
    fn default() -> Self {
        Self {
            caution: dec!(2.5),
            warning: dec!(2.0),
            critical: dec!(1.5),
        }
    }
}

impl LeverageThresholds {
    /// Bands are ordered and positive
    pub fn is_valid(&self) -> bool {
        Decimal::ZERO < self.critical
            && self.critical < self.warning
            && self.warning < self.caution
    }
}

/// Hard limits consumed by the gate chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    pub leverage: LeverageThresholds,
    /// Fraction of day-start equity that may be lost in one day, in (0, 1]
    pub max_daily_loss_pct: Decimal,
    pub max_consecutive_losses: u32,
    /// Fraction of tradable equity one proposal may risk, in (0, 1]
    pub max_position_pct: Decimal,
    /// Sizes below this are not worth executing; clamping under it denies
    pub min_viable_size: Decimal,
    /// Size multiplier applied in the leverage throttle band, in (0, 1)
    pub throttle_fraction: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            leverage: LeverageThresholds::default(),
            max_daily_loss_pct: dec!(0.10),
            max_consecutive_losses: 3,
            max_position_pct: dec!(0.10),
            min_viable_size: dec!(10),
            throttle_fraction: dec!(0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_ordered() {
        assert!(LeverageThresholds::default().is_valid());
    }

    #[test]
    fn test_unordered_thresholds_invalid() {
        let bands = LeverageThresholds {
            caution: dec!(1.5),
            warning: dec!(2.0),
            critical: dec!(2.5),
        };
        assert!(!bands.is_valid());
    }
}
