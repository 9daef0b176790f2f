//! Wall-clock abstraction so unlock status can be evaluated deterministically in tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current time in seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> u64;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        // Pre-epoch clocks are clamped rather than wrapped.
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// A manually driven clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_unix(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_moves_only_when_told() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.now_unix(), 1_000);
        clock.advance(86_400);
        assert_eq!(clock.now_unix(), 87_400);
        clock.set(5);
        assert_eq!(clock.now_unix(), 5);
    }

    #[test]
    fn test_system_clock_is_past_2020() {
        assert!(SystemClock.now_unix() > 1_577_836_800);
    }
}
