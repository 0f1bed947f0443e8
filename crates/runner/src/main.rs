//! Janus Runner Binary
//!
//! Loads and validates the configuration, wires the collaborators and
//! drives the orchestrator in single-cycle or continuous mode. With
//! `--demo` the simulated collaborators stand in for the real scanner,
//! leverage feed and execution venue.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use janus_clock::{CycleScheduler, SystemClock};
use janus_core::{Strategy, StrategyKind};
use janus_runner::{
    Command, CycleOrchestrator, RunMode, RunnerConfig, SimulatedExecution, SimulatedLeverageFeed,
    SimulatedSignalSource,
};
use log::{error, info};
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (config, demo) = match args.next().as_deref() {
        Some("--demo") => (RunnerConfig::default(), true),
        Some(path) => match RunnerConfig::from_file(path) {
            Ok(config) => (config, false),
            Err(err) => {
                error!("[MAIN] Refusing to start: {}", err);
                return ExitCode::FAILURE;
            }
        },
        None => {
            eprintln!("usage: janus-runner <config.json> | --demo");
            return ExitCode::FAILURE;
        }
    };

    if !demo {
        // Real collaborator wiring lives outside this repository; the
        // binary currently only ships the simulated set.
        error!("[MAIN] Only --demo collaborators are available in this build");
        return ExitCode::FAILURE;
    }

    let clock = Arc::new(SystemClock::new());
    let pairs = vec![
        ("grid-btc".into(), "BTC-USD".to_string()),
        ("momo-eth".into(), "ETH-USD".to_string()),
        ("basis-sol".into(), "SOL-USD".to_string()),
    ];
    let signals = Arc::new(SimulatedSignalSource::new(pairs.clone(), clock.clone(), 1));
    let leverage = Arc::new(SimulatedLeverageFeed::healthy(dec!(2.8)));
    let execution = Arc::new(SimulatedExecution::new(clock.clone(), 0.55, 2));

    let run_mode = config.run_mode;
    let interval = config.cycle_interval();
    let mut orchestrator =
        match CycleOrchestrator::new(config, clock, signals, leverage, execution) {
            Ok(orchestrator) => orchestrator,
            Err(err) => {
                error!("[MAIN] Failed to initialize: {}", err);
                return ExitCode::FAILURE;
            }
        };

    // Seed the demo strategies on a fresh state document
    if orchestrator.registry().is_empty() {
        for (id, _) in &pairs {
            let strategy = Strategy::new(
                id.clone(),
                id.to_string(),
                StrategyKind::Momentum,
                Utc::now(),
            );
            if let Err(err) = orchestrator.register_strategy(strategy) {
                error!("[MAIN] Failed to seed demo strategy: {}", err);
                return ExitCode::FAILURE;
            }
        }
    }

    match run_mode {
        RunMode::SingleCycle => match orchestrator.run_cycle().await {
            Ok(report) => {
                info!(
                    "[MAIN] Cycle {} produced {} decisions",
                    report.cycle_id,
                    report.decisions.len()
                );
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("[MAIN] Cycle failed: {}", err);
                ExitCode::FAILURE
            }
        },
        RunMode::Continuous => {
            let (scheduler, shutdown) = CycleScheduler::new(interval);
            let (_command_tx, command_rx) = mpsc::channel::<Command>(16);

            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("[MAIN] Ctrl-C received, shutting down gracefully");
                    shutdown.shutdown();
                }
            });

            match orchestrator.run(scheduler, command_rx).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!("[MAIN] Orchestrator halted: {}", err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
