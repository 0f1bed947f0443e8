//! Janus Ports
//!
//! Port definitions (traits) for the Janus system. These define the
//! boundaries between the decision/risk-gating core and its external
//! collaborators: the market scanner, the execution venue, the
//! leverage-position feed and the clock. Implementations live outside
//! the core; the core only ever sees these narrow interfaces.

mod clock;
mod error;
mod execution;
mod leverage;
mod market_data;

pub use clock::Clock;
pub use error::{PortError, PortResult};
pub use execution::{ExecutionAck, ExecutionAdapter};
pub use leverage::{LeverageHealthProvider, LeveragePosition};
pub use market_data::MarketSignalSource;
