use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use janus_core::Timestamp;
use janus_ports::Clock;

/// Manually driven clock for deterministic tests
///
/// Time only moves when `advance` or `set_time` is called, so cycle and
/// day-boundary behavior can be exercised without wall-clock waits. The
/// handle is cheap to clone and shares the underlying time.
#[derive(Clone)]
pub struct ManualClock {
    current: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Create a clock frozen at the given time
    pub fn at(initial: Timestamp) -> Self {
        Self {
            current: Arc::new(Mutex::new(initial)),
        }
    }

    /// Create a clock frozen at the current wall time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Jump forward by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap();
        *current += duration;
    }

    /// Explicitly set the time. Can move backwards; use with caution.
    pub fn set_time(&self, time: Timestamp) {
        let mut current = self.current.lock().unwrap();
        *current = time;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap()
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
