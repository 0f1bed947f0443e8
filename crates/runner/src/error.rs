//! Runner errors

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum Error {
    /// The atomic state write failed: the cycle's output is not
    /// committed, last-known-good state is preserved, and the
    /// orchestrator must stop rather than trade against unknown state.
    #[error("State persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("Registry rejected a mutation: {0}")]
    Registry(#[from] janus_registry::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
