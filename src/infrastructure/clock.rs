//! Clock adapters.
//!
//! The limiter only compares elapsed time, so the production clock is the
//! monotonic `Instant`. Wall-clock jumps never open or close a window.
//!
//! # Testing
//!
//! See `MockClock` (in `crate::infrastructure::mocks`) for a clock that only
//! moves when told to. Available with the `test-helpers` feature or in test
//! builds.

use crate::application::ports::Clock;
use std::time::Instant;

/// Monotonic system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
