use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PortResult;

/// Live snapshot of the leveraged lending position
///
/// Health factor is the collateral-to-debt safety ratio of the venue;
/// below 1.0 the position is liquidatable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeveragePosition {
    pub health_factor: Decimal,
    pub collateral_usd: Decimal,
    pub debt_usd: Decimal,
    pub liquidation_price: Decimal,
}

/// Port for the lending-position feed (e.g. an AAVE-style market)
#[async_trait]
pub trait LeverageHealthProvider: Send + Sync {
    /// Fetch the current position state
    async fn fetch_position(&self, timeout: Duration) -> PortResult<LeveragePosition>;
}
