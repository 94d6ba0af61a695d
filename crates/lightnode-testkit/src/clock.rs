//! Manually advanced clock

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lightnode_core::effects::TimeEffects;

/// Clock that only moves when a test moves it
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `now_ms`
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    /// Jump to `now_ms`
    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    /// Move forward by `delta_ms`
    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: Duration) {
        self.advance_ms(u64::try_from(delta.as_millis()).unwrap_or(u64::MAX));
    }
}

impl TimeEffects for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_moves_only_when_told() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);

        clock.advance(Duration::from_secs(300));
        assert_eq!(clock.now_ms(), 301_000);

        clock.set_ms(5);
        assert_eq!(clock.now_ms(), 5);
    }
}
