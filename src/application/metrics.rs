//! Throttling counters.
//!
//! Lets the embedding application see how much a limiter is dropping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters of limiter decisions.
///
/// Clones share the same counters. All updates are relaxed atomics; the
/// counters are independent and only read for reporting.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    events_allowed: AtomicU64,
    events_suppressed: AtomicU64,
    overflow_notices: AtomicU64,
}

impl Metrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_allowed(&self) {
        self.inner.events_allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.inner.events_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_overflow(&self) {
        self.inner.overflow_notices.fetch_add(1, Ordering::Relaxed);
    }

    /// Events let through, including those seen while limiting is disabled.
    pub fn events_allowed(&self) -> u64 {
        self.inner.events_allowed.load(Ordering::Relaxed)
    }

    /// Events suppressed.
    pub fn events_suppressed(&self) -> u64 {
        self.inner.events_suppressed.load(Ordering::Relaxed)
    }

    /// Overflow edges observed, one per run of suppressed events on a key.
    pub fn overflow_notices(&self) -> u64 {
        self.inner.overflow_notices.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_allowed: self.events_allowed(),
            events_suppressed: self.events_suppressed(),
            overflow_notices: self.overflow_notices(),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.inner.events_allowed.store(0, Ordering::Relaxed);
        self.inner.events_suppressed.store(0, Ordering::Relaxed);
        self.inner.overflow_notices.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Events let through
    pub events_allowed: u64,
    /// Events suppressed
    pub events_suppressed: u64,
    /// Overflow edges observed
    pub overflow_notices: u64,
}

impl MetricsSnapshot {
    /// Fraction of events suppressed, 0.0 when nothing was processed.
    pub fn suppression_rate(&self) -> f64 {
        let total = self.total_events();
        if total == 0 {
            0.0
        } else {
            self.events_suppressed as f64 / total as f64
        }
    }

    /// Allowed plus suppressed.
    pub fn total_events(&self) -> u64 {
        self.events_allowed.saturating_add(self.events_suppressed)
    }
}
