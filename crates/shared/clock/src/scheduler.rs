use std::time::Duration;

use log::info;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// What woke the scheduler up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The interval elapsed; run a cycle
    Fire,
    /// Graceful shutdown was requested; cancel the current wait
    Shutdown,
}

/// Clone-able handle that cancels a running scheduler
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    /// Request shutdown. Idempotent; wakes any in-flight wait.
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Cancellable fixed-interval cycle trigger
///
/// Replaces sleep-loop "continuous mode": the orchestrator awaits `tick`
/// and receives either `Fire` or `Shutdown`, so cycle logic never owns a
/// wall-clock wait of its own. Missed ticks are skipped, not bursted, to
/// keep cycles from piling up after a stall.
pub struct CycleScheduler {
    interval: Interval,
    shutdown_rx: watch::Receiver<bool>,
}

impl CycleScheduler {
    pub fn new(period: Duration) -> (Self, ShutdownHandle) {
        let (tx, shutdown_rx) = watch::channel(false);
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        (
            Self {
                interval,
                shutdown_rx,
            },
            ShutdownHandle { tx },
        )
    }

    /// Wait for the next cycle trigger or a shutdown request,
    /// whichever comes first.
    pub async fn tick(&mut self) -> Tick {
        if *self.shutdown_rx.borrow() {
            return Tick::Shutdown;
        }

        tokio::select! {
            _ = self.interval.tick() => Tick::Fire,
            result = self.shutdown_rx.changed() => {
                match result {
                    Ok(()) if *self.shutdown_rx.borrow() => {
                        info!("[SCHED] Shutdown requested, cancelling wait");
                        Tick::Shutdown
                    }
                    // Sender dropped: treat as shutdown rather than spin
                    Err(_) => Tick::Shutdown,
                    Ok(()) => Tick::Fire,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_on_interval() {
        let (mut sched, _handle) = CycleScheduler::new(Duration::from_secs(60));

        // First tick of tokio's interval completes immediately
        assert_eq!(sched.tick().await, Tick::Fire);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(sched.tick().await, Tick::Fire);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_wait() {
        let (mut sched, handle) = CycleScheduler::new(Duration::from_secs(3600));
        assert_eq!(sched.tick().await, Tick::Fire);

        handle.shutdown();
        assert_eq!(sched.tick().await, Tick::Shutdown);

        // Stays shut down; no further ticks fire
        assert_eq!(sched.tick().await, Tick::Shutdown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_from_cloned_handle() {
        let (mut sched, handle) = CycleScheduler::new(Duration::from_secs(3600));
        assert_eq!(sched.tick().await, Tick::Fire);

        let other = handle.clone();
        other.shutdown();
        assert_eq!(sched.tick().await, Tick::Shutdown);
    }
}
