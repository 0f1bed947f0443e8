//! Janus Runner - Cycle Orchestration
//!
//! Drives the full decision pipeline on a fixed schedule:
//!
//! - **Config**: validated startup configuration (fatal on bad values)
//! - **Ingest**: outcome reconciliation and signal normalization
//! - **Store**: atomic write-to-temp-then-rename state persistence
//! - **Orchestrator**: the INGEST -> SCORE -> REBALANCE -> GATE ->
//!   PERSIST -> EMIT state machine
//! - **Sim**: seedable collaborator simulators for the demo mode
//!
//! ## Architecture
//!
//! ```text
//!   MarketSignalSource ──┐                       ┌── Decision stream
//!   LeverageHealthFeed ──┤                       │   (broadcast)
//!   ExecutionAdapter ────┤                       │
//!                        ▼                       │
//!               ┌─────────────────┐              │
//!               │ CycleOrchestr.  │──────────────┤
//!               │  ingest->score  │              │
//!               │  ->rebalance    │              └── ExecutionAdapter
//!               │  ->gate->persist│                  (approved only)
//!               └────────┬────────┘
//!                        │ atomic state document per cycle
//!                        ▼
//!                   StateStore
//! ```

pub mod config;
pub mod error;
pub mod ingest;
pub mod orchestrator;
pub mod sim;
pub mod store;

// Re-export main types
pub use config::{AllocationConfig, ConfigError, RunMode, RunnerConfig};
pub use error::{Error, Result};
pub use ingest::SignalIngestor;
pub use orchestrator::{Command, CycleOrchestrator, CycleReport};
pub use sim::{SimulatedExecution, SimulatedLeverageFeed, SimulatedSignalSource};
pub use store::{StateDocument, StateStore, StoreError};
