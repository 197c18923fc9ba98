//! Per-key throttling state.
//!
//! Each tracked key owns one `KeyState`: either a fixed-window counter or a
//! sliding-window buffer of admission timestamps, plus the flag used to detect
//! the overflow edge (the call on which the key first goes over its limit).

use serde::Deserialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Counting policy applied to every key of a limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitMode {
    /// Count resets once the interval has elapsed since the window started
    #[default]
    FixedWindow,
    /// At most `limit` admissions in any trailing interval
    SlidingWindow,
}

/// The limit and interval a window is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    /// Maximum admissions per window
    pub limit: u64,
    /// Window length; `None` never expires
    pub interval: Option<Duration>,
}

impl WindowBounds {
    /// Create bounds from a limit and an optional interval.
    pub fn new(limit: u64, interval: Option<Duration>) -> Self {
        Self { limit, interval }
    }

    /// Check whether something stamped at `since` has left the window.
    ///
    /// A zero interval expires everything immediately.
    pub fn is_expired(&self, since: Instant, now: Instant) -> bool {
        match self.interval {
            None => false,
            Some(interval) if interval.is_zero() => true,
            Some(interval) => now.saturating_duration_since(since) > interval,
        }
    }
}

/// Fixed-window counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWindow {
    window_start: Instant,
    count: u64,
}

impl FixedWindow {
    /// Create an empty window starting at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }

    /// Count one event, restarting the window first if it expired.
    ///
    /// Returns the post-increment count.
    pub fn register(&mut self, bounds: &WindowBounds, now: Instant) -> u64 {
        if bounds.is_expired(self.window_start, now) {
            self.reset(now);
        }
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Zero the counter and restart the window at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.window_start = now;
        self.count = 0;
    }

    /// Events counted in the current window.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// When the current window started.
    pub fn window_start(&self) -> Instant {
        self.window_start
    }
}

/// Sliding-window buffer of admission timestamps, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlidingWindow {
    timestamps: VecDeque<Instant>,
}

impl SlidingWindow {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evict expired admissions, then try to admit one at `now`.
    ///
    /// Returns the slot this event occupies: the number of live admissions
    /// before it plus one. The event was admitted iff that is `<= limit`.
    pub fn admit(&mut self, bounds: &WindowBounds, now: Instant) -> u64 {
        self.expire(bounds, now);

        let live = self.timestamps.len() as u64;
        if live < bounds.limit {
            self.timestamps.push_back(now);
        }
        live.saturating_add(1)
    }

    /// Drop admissions from the front while they are expired.
    ///
    /// Timestamps are appended in time order, so the first live entry ends
    /// the scan. If every entry is expired the buffer is left empty.
    fn expire(&mut self, bounds: &WindowBounds, now: Instant) {
        while let Some(&oldest) = self.timestamps.front() {
            if bounds.is_expired(oldest, now) {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Number of admissions currently held.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if no admissions are held.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Admission timestamps, oldest first.
    pub fn timestamps(&self) -> impl Iterator<Item = &Instant> {
        self.timestamps.iter()
    }
}

/// Window state variant of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowState {
    /// Fixed-window counter
    Fixed(FixedWindow),
    /// Sliding-window buffer
    Sliding(SlidingWindow),
}

/// Outcome of registering one event against a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Count (fixed) or window slot (sliding) this event occupies
    pub occupancy: u64,
    /// Whether the event is over the limit
    pub suppressed: bool,
    /// Whether this event is the first one over the limit
    pub overflow_edge: bool,
}

/// State tracked for each key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyState {
    window: WindowState,
    over_limit: bool,
}

impl KeyState {
    /// Create fresh state for `mode`, starting at `now`.
    pub fn new(mode: LimitMode, now: Instant) -> Self {
        let window = match mode {
            LimitMode::FixedWindow => WindowState::Fixed(FixedWindow::new(now)),
            LimitMode::SlidingWindow => WindowState::Sliding(SlidingWindow::new()),
        };
        Self {
            window,
            over_limit: false,
        }
    }

    /// The mode this state was created for.
    pub fn mode(&self) -> LimitMode {
        match self.window {
            WindowState::Fixed(_) => LimitMode::FixedWindow,
            WindowState::Sliding(_) => LimitMode::SlidingWindow,
        }
    }

    /// Register one event and update the overflow edge.
    pub fn register(&mut self, bounds: &WindowBounds, now: Instant) -> Registration {
        let occupancy = match &mut self.window {
            WindowState::Fixed(window) => window.register(bounds, now),
            WindowState::Sliding(window) => window.admit(bounds, now),
        };

        let suppressed = occupancy > bounds.limit;
        let overflow_edge = suppressed && !self.over_limit;
        self.over_limit = suppressed;

        Registration {
            occupancy,
            suppressed,
            overflow_edge,
        }
    }

    /// Reset a fixed-window counter in place.
    ///
    /// Sliding buffers are left untouched. Returns whether a reset happened.
    pub fn reset_fixed(&mut self, now: Instant) -> bool {
        match &mut self.window {
            WindowState::Fixed(window) => {
                window.reset(now);
                self.over_limit = false;
                true
            }
            WindowState::Sliding(_) => false,
        }
    }

    /// The window state.
    pub fn window(&self) -> &WindowState {
        &self.window
    }

    /// Whether the last registered event was over the limit.
    pub fn is_over_limit(&self) -> bool {
        self.over_limit
    }
}
