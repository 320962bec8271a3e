//! Wall-clock source for expiry computations.

/// Source of the current time in Unix epoch seconds.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> i64;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Mock clock for testing.
pub mod mock {
    use super::Clock;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct ManualClock {
        now: AtomicI64,
    }

    impl ManualClock {
        /// Create a clock frozen at `now` (epoch seconds).
        #[must_use]
        pub fn new(now: i64) -> Self {
            Self {
                now: AtomicI64::new(now),
            }
        }

        pub fn set(&self, now: i64) {
            self.now.store(now, Ordering::SeqCst);
        }

        pub fn advance(&self, seconds: i64) {
            self.now.fetch_add(seconds, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_epoch_seconds(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }
}
