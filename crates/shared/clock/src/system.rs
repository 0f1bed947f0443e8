use chrono::Utc;
use janus_core::Timestamp;
use janus_ports::Clock;

/// Real system clock for production use
///
/// This simply returns the current wall-clock time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_never_runs_backwards() {
        let clock = SystemClock::new();
        let mut previous = clock.now();
        for _ in 0..100 {
            let current = clock.now();
            assert!(current >= previous);
            previous = current;
        }
    }
}
