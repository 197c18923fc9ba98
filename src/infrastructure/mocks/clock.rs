//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Clock that only moves when told to.
///
/// Lets tests step across window boundaries exactly instead of sleeping.
///
/// # Examples
///
/// ```
/// use log_limiter::infrastructure::mocks::MockClock;
/// use log_limiter::RateLimiter;
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
///
/// let clock = Arc::new(MockClock::new(Instant::now()));
/// let limiter: RateLimiter<String> = RateLimiter::builder()
///     .with_limit(1)
///     .with_interval(Duration::from_millis(10))
///     .with_clock(clock.clone())
///     .build()
///     .unwrap();
///
/// assert!(!limiter.reached("key"));
/// assert!(limiter.reached("key"));
///
/// clock.advance(Duration::from_millis(11));
/// assert!(!limiter.reached("key"));
/// assert_eq!(clock.elapsed(), Duration::from_millis(11));
/// ```
///
/// Clones share the same time, so a clock handed to a limiter can still be
/// driven from the test.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a mock clock standing at `start`.
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        *self.lock() += duration;
    }

    /// Move the clock forward by a number of seconds.
    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }

    /// Place the clock `elapsed` after its start.
    pub fn set_elapsed(&self, elapsed: Duration) {
        *self.lock() = elapsed;
    }

    /// Time elapsed since the start.
    pub fn elapsed(&self) -> Duration {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Duration> {
        self.elapsed
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}
