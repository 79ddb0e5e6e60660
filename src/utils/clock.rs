//! Time source used for retry backoff and job polling.

use std::time::{Duration, Instant};

/// Wall clock and sleep, abstracted so delays can be observed in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Block the calling thread.
    fn sleep(&self, duration: Duration);
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
