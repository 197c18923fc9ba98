//! # log-limiter
//!
//! Per-key rate limiting for log output, with a `tracing` integration.
//!
//! The core is [`RateLimiter`]: for each candidate log event it answers
//! whether the event's key has reached its limit, and hands out an overflow
//! message exactly once per run of suppressed events so callers can tell
//! readers that output is being dropped.
//!
//! ## Quick Start
//!
//! ```rust
//! use log_limiter::RateLimiter;
//! use std::time::Duration;
//!
//! let limiter: RateLimiter<String> = RateLimiter::builder()
//!     .with_limit(2)
//!     .with_interval(Duration::from_secs(60))
//!     .with_overflow_message("too many connection errors, muting")
//!     .build()
//!     .unwrap();
//!
//! for _ in 0..5 {
//!     let verdict = limiter.check("db");
//!     if let Some(message) = verdict.overflow_message() {
//!         eprintln!("{message}");
//!     }
//!     if verdict.is_allowed() {
//!         eprintln!("connection error");
//!     }
//! }
//! ```
//!
//! ## Window Modes
//!
//! - **Fixed window** (default): a counter per key restarts once the interval
//!   has elapsed since the window opened. Without an interval the counter
//!   never restarts, so a key gets `limit` events for its whole lifetime.
//! - **Sliding window**: each key keeps the timestamps of its admitted events
//!   and admits a new one while fewer than `limit` fall within the interval.
//!
//! ## Intervals
//!
//! Intervals are plain [`std::time::Duration`]s. Values given as a number plus
//! a unit token (`"s"`, `"minutes"`, `"h"`, ...) are normalized through
//! [`IntervalSpec`]; unknown units and negative values are rejected with
//! [`ConfigError`] when the limiter is built.
//!
//! ## Tracing Integration
//!
//! [`ThrottleFilter`] plugs a limiter into `tracing_subscriber` as a
//! per-layer filter. Events are keyed by call-site, by message, or by a field
//! value, and overflow notices go to a handler of your choice:
//!
//! ```rust,no_run
//! use log_limiter::{KeyBy, OverflowNotice, RateLimiter, ThrottleFilter};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tracing_subscriber::prelude::*;
//!
//! let throttle = ThrottleFilter::builder()
//!     .with_limiter(
//!         RateLimiter::builder()
//!             .with_limit(100)
//!             .with_interval(Duration::from_secs(60))
//!             .sliding(true),
//!     )
//!     .key_by(KeyBy::Message)
//!     .with_exempt_targets(vec!["myapp::audit".to_string()])
//!     .on_overflow(Arc::new(|notice: &OverflowNotice<'_>| {
//!         eprintln!("[{} {}] {}", notice.level, notice.target, notice.message)
//!     }))
//!     .build()
//!     .unwrap();
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer().with_filter(throttle))
//!     .init();
//! ```
//!
//! ## Configuration Files
//!
//! [`LimiterSettings`] deserializes the user-facing options with serde:
//!
//! ```rust
//! # use log_limiter::{LimiterSettings, RateLimiter};
//! let settings: LimiterSettings =
//!     serde_json::from_str(r#"{ "limit": 5, "interval": 30, "sliding": true }"#).unwrap();
//! let limiter: RateLimiter<String> = settings.into_builder().build().unwrap();
//! assert!(!limiter.reached("key"));
//! ```
//!
//! ## Administration
//!
//! - [`RateLimiter::reset_all`] restarts every fixed-window counter.
//! - [`RateLimiter::wipe`] forgets all keys and keeps the configuration.
//! - [`RateLimiter::reconfigure`] swaps the configuration and drops all state.
//!
//! ## Observability
//!
//! ```rust
//! # use log_limiter::RateLimiter;
//! # let limiter: RateLimiter<String> = RateLimiter::builder().with_limit(1).build().unwrap();
//! limiter.reached("a");
//! limiter.reached("a");
//! let snapshot = limiter.metrics().snapshot();
//! assert_eq!(snapshot.events_allowed, 1);
//! assert_eq!(snapshot.events_suppressed, 1);
//! assert_eq!(snapshot.overflow_notices, 1);
//! ```

// Domain layer - pure window arithmetic
pub mod domain;

// Application layer - limiter orchestration
pub mod application;

// Infrastructure layer - clocks, storage and tracing adapters
pub mod infrastructure;

pub use domain::{
    error::ConfigError,
    interval::{IntervalSpec, IntervalUnit},
    key::EventKey,
    key_state::{KeyState, LimitMode, WindowBounds},
};

pub use application::{
    config::{LimiterConfig, LimiterSettings, DEFAULT_OVERFLOW_MESSAGE},
    limiter::{LimitDecision, RateLimiter, RateLimiterBuilder, Verdict},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Storage},
};

pub use infrastructure::{
    clock::SystemClock,
    layer::{
        stderr_overflow_handler, KeyBy, OverflowHandler, OverflowNotice, ThrottleFilter,
        ThrottleFilterBuilder,
    },
    storage::ShardedStorage,
};
