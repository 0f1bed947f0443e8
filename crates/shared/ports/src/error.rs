use thiserror::Error;
use uuid::Uuid;

/// Failures at a collaborator boundary
///
/// Timeouts are recoverable by design: the cycle proceeds in degraded
/// mode and retries next interval. Nothing here is allowed to crash the
/// orchestrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("{collaborator} did not respond within the configured timeout")]
    Timeout { collaborator: &'static str },

    #[error("execution venue did not acknowledge decision {decision_id} in time")]
    AckTimeout { decision_id: Uuid },

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

pub type PortResult<T> = std::result::Result<T, PortError>;
