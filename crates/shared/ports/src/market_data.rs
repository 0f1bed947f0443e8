use std::time::Duration;

use async_trait::async_trait;
use janus_core::SignalObservation;

use crate::error::PortResult;

/// Port for the external market scanner
///
/// Supplies per-tick strategy observations. May be slow or unavailable;
/// callers bound every poll with a timeout and treat `PortError::Timeout`
/// as a degraded (not fatal) cycle.
#[async_trait]
pub trait MarketSignalSource: Send + Sync {
    /// Fetch the observations that arrived since the last poll
    async fn poll_signals(&self, timeout: Duration) -> PortResult<Vec<SignalObservation>>;
}
