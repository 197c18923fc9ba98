//! Rate limiter coordination logic.
//!
//! The rate limiter owns the per-key state map, the clock and the shared
//! configuration. For every candidate event it decides whether the event is
//! let through or suppressed, and reports the overflow edge: the one call per
//! run of suppressed events on which the overflow message should be emitted.

use crate::application::config::{LimiterConfig, DEFAULT_OVERFLOW_MESSAGE};
use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Storage};
use crate::domain::error::ConfigError;
use crate::domain::interval::{IntervalSpec, IntervalUnit};
use crate::domain::key_state::{KeyState, LimitMode};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::storage::ShardedStorage;

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

/// Decision about how to handle an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDecision {
    /// Allow the event to pass through
    Allow,
    /// Suppress the event
    Suppress,
}

/// Result of checking one event: the decision and, on the overflow edge,
/// the message to emit.
///
/// Returning both together means concurrent callers can neither lose nor
/// duplicate an overflow notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    decision: LimitDecision,
    overflow_message: Option<Arc<str>>,
}

impl Verdict {
    fn allow() -> Self {
        Self {
            decision: LimitDecision::Allow,
            overflow_message: None,
        }
    }

    /// The allow/suppress decision.
    pub fn decision(&self) -> LimitDecision {
        self.decision
    }

    /// Check if the event should be let through.
    pub fn is_allowed(&self) -> bool {
        self.decision == LimitDecision::Allow
    }

    /// Check if the event should be dropped.
    pub fn is_suppressed(&self) -> bool {
        self.decision == LimitDecision::Suppress
    }

    /// The overflow message, present only on the overflow edge.
    pub fn overflow_message(&self) -> Option<&str> {
        self.overflow_message.as_deref()
    }

    /// Take the overflow message out of the verdict.
    pub fn into_overflow_message(self) -> Option<Arc<str>> {
        self.overflow_message
    }
}

/// Builder for constructing a `RateLimiter`.
///
/// Defaults: no limit (everything passes), no interval, fixed window, no
/// overflow message, system clock.
#[derive(Debug, Clone, Default)]
pub struct RateLimiterBuilder {
    limit: Option<u64>,
    interval: Option<IntervalSpec>,
    mode: LimitMode,
    overflow_message: Option<Arc<str>>,
    clock: Option<Arc<dyn Clock>>,
}

impl RateLimiterBuilder {
    /// Set the maximum number of admissions per window.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Remove the limit, disabling throttling.
    pub fn without_limit(mut self) -> Self {
        self.limit = None;
        self
    }

    /// Set the window length.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval.into());
        self
    }

    /// Set the window length from a configuration value.
    ///
    /// The value is validated when `build()` is called.
    pub fn with_interval_spec(mut self, interval: IntervalSpec) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the window length as a value in the given unit.
    ///
    /// The value is validated when `build()` is called.
    pub fn with_interval_in(mut self, value: f64, unit: IntervalUnit) -> Self {
        self.interval = Some(IntervalSpec::with_unit(value, unit));
        self
    }

    /// Remove the interval; fixed-window counters then never reset.
    pub fn without_interval(mut self) -> Self {
        self.interval = None;
        self
    }

    /// Select sliding-window (`true`) or fixed-window (`false`) semantics.
    pub fn sliding(mut self, sliding: bool) -> Self {
        self.mode = if sliding {
            LimitMode::SlidingWindow
        } else {
            LimitMode::FixedWindow
        };
        self
    }

    /// Set the counting mode.
    pub fn with_mode(mut self, mode: LimitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the message reported once per overflow transition.
    pub fn with_overflow_message(mut self, message: impl Into<Arc<str>>) -> Self {
        self.overflow_message = Some(message.into());
        self
    }

    /// Use `DEFAULT_OVERFLOW_MESSAGE` unless a message is already set.
    pub fn or_default_overflow_message(mut self) -> Self {
        if self.overflow_message.is_none() {
            self.overflow_message = Some(Arc::from(DEFAULT_OVERFLOW_MESSAGE));
        }
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate and normalize the options into a `LimiterConfig`.
    ///
    /// # Errors
    /// Returns `ConfigError` if the interval is malformed.
    pub fn config(&self) -> Result<LimiterConfig, ConfigError> {
        let interval = self
            .interval
            .as_ref()
            .map(IntervalSpec::to_duration)
            .transpose()?;

        Ok(LimiterConfig {
            limit: self.limit,
            interval,
            mode: self.mode,
            overflow_message: self.overflow_message.clone(),
        })
    }

    /// Build the limiter.
    ///
    /// # Errors
    /// Returns `ConfigError` if the interval is malformed.
    pub fn build<K>(self) -> Result<RateLimiter<K>, ConfigError>
    where
        K: Hash + Eq + Send + Sync + Debug,
    {
        let config = self.config()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        Ok(RateLimiter::with_storage(
            Arc::new(ShardedStorage::new()),
            config,
            clock,
        ))
    }
}

/// Per-key rate limiter.
///
/// Cloning is cheap; clones share state, configuration and metrics.
///
/// # Example
/// ```
/// use log_limiter::RateLimiter;
/// use std::time::Duration;
///
/// let limiter: RateLimiter<String> = RateLimiter::builder()
///     .with_limit(1)
///     .with_interval(Duration::from_secs(1))
///     .with_overflow_message("throttled")
///     .build()
///     .unwrap();
///
/// assert!(!limiter.reached("db"));
/// assert!(limiter.reached("db"));
/// assert_eq!(limiter.overflow_message().as_deref(), Some("throttled"));
/// assert!(limiter.reached("db"));
/// assert_eq!(limiter.overflow_message(), None);
/// ```
#[derive(Debug)]
pub struct RateLimiter<K, S = Arc<ShardedStorage<K, KeyState>>>
where
    K: Hash + Eq + Send + Sync + Debug,
    S: Storage<K, KeyState> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    config: Arc<RwLock<LimiterConfig>>,
    last_edge: Arc<AtomicBool>,
    metrics: Metrics,
    _key: PhantomData<fn() -> K>,
}

impl<K, S> Clone for RateLimiter<K, S>
where
    K: Hash + Eq + Send + Sync + Debug,
    S: Storage<K, KeyState> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            clock: Arc::clone(&self.clock),
            config: Arc::clone(&self.config),
            last_edge: Arc::clone(&self.last_edge),
            metrics: self.metrics.clone(),
            _key: PhantomData,
        }
    }
}

impl RateLimiter<String> {
    /// Create a builder for configuring a limiter.
    pub fn builder() -> RateLimiterBuilder {
        RateLimiterBuilder::default()
    }
}

impl<K, S> RateLimiter<K, S>
where
    K: Hash + Eq + Send + Sync + Debug,
    S: Storage<K, KeyState> + Clone,
{
    /// Create a limiter over a custom storage backend.
    pub fn with_storage(storage: S, config: LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            config: Arc::new(RwLock::new(config)),
            last_edge: Arc::new(AtomicBool::new(false)),
            metrics: Metrics::new(),
            _key: PhantomData,
        }
    }

    fn read_config(&self) -> RwLockReadGuard<'_, LimiterConfig> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check one event for `key` and report whether it must be suppressed.
    ///
    /// Returns `true` when the limit is reached (drop the event) and `false`
    /// when the event may be written. Pair with `overflow_message()` to learn
    /// whether this call was the overflow edge.
    pub fn reached<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.check(key).is_suppressed()
    }

    /// Check one event for `key`, returning the decision and the overflow
    /// message together.
    ///
    /// # Performance
    /// Known keys are looked up without allocating. The configuration read
    /// lock is held for the whole decision, so `reconfigure` never interleaves
    /// with it.
    pub fn check<Q>(&self, key: &Q) -> Verdict
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let config = self.read_config();

        let Some(bounds) = config.bounds() else {
            self.last_edge.store(false, Ordering::Relaxed);
            self.metrics.record_allowed();
            return Verdict::allow();
        };

        let now = self.clock.now();
        let mode = config.mode;
        let registration = self.storage.with_entry_mut(
            key,
            || KeyState::new(mode, now),
            |state| state.register(&bounds, now),
        );

        self.last_edge
            .store(registration.overflow_edge, Ordering::Relaxed);

        if !registration.suppressed {
            self.metrics.record_allowed();
            return Verdict::allow();
        }

        self.metrics.record_suppressed();
        let overflow_message = if registration.overflow_edge {
            self.metrics.record_overflow();
            config.overflow_message.clone()
        } else {
            None
        };

        Verdict {
            decision: LimitDecision::Suppress,
            overflow_message,
        }
    }

    /// The overflow message if the most recent check was an overflow edge.
    ///
    /// Call right after `reached`. Under concurrent use another thread's
    /// check may land in between; use `check` there instead.
    pub fn overflow_message(&self) -> Option<Arc<str>> {
        if !self.last_edge.load(Ordering::Relaxed) {
            return None;
        }
        self.read_config().overflow_message.clone()
    }

    /// Restart every fixed-window counter at zero.
    ///
    /// Sliding-window buffers are not touched.
    pub fn reset_all(&self) {
        let mut reset = 0usize;
        {
            let _config = self.read_config();
            let now = self.clock.now();
            self.storage.for_each_mut(|_, state| {
                if state.reset_fixed(now) {
                    reset += 1;
                }
            });
        }

        tracing::debug!(keys = reset, "reset fixed-window counters");
    }

    /// Forget all tracked keys. Configuration is kept.
    pub fn wipe(&self) {
        let keys = {
            let _config = self.read_config();
            let keys = self.storage.len();
            self.storage.clear();
            self.last_edge.store(false, Ordering::Relaxed);
            keys
        };

        tracing::debug!(keys, "wiped rate limiter state");
    }

    /// Replace the configuration wholesale.
    ///
    /// All tracked state is discarded, since existing entries were built for
    /// the previous limit, interval and mode.
    pub fn reconfigure(&self, config: LimiterConfig) {
        let (limit, interval, mode) = (config.limit, config.interval, config.mode);
        {
            let mut current = self.config.write().unwrap_or_else(PoisonError::into_inner);
            self.storage.clear();
            self.last_edge.store(false, Ordering::Relaxed);
            *current = config;
        }

        tracing::debug!(?limit, ?interval, ?mode, "reconfigured rate limiter");
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> LimiterConfig {
        self.read_config().clone()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Visit the state of every tracked key.
    ///
    /// The callback sees a snapshot taken before it runs, so it may call
    /// back into this limiter. Changes made meanwhile are not reflected.
    pub fn for_each_key<F>(&self, mut f: F)
    where
        K: Clone,
        F: FnMut(&K, &KeyState),
    {
        let mut snapshot = Vec::with_capacity(self.storage.len());
        self.storage
            .for_each(|key, state| snapshot.push((key.clone(), state.clone())));

        for (key, state) in &snapshot {
            f(key, state);
        }
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::key_state::WindowState;
    use crate::infrastructure::mocks::MockClock;
    use std::time::Instant;

    fn limiter_with_clock(builder: RateLimiterBuilder) -> (RateLimiter<String>, Arc<MockClock>) {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = builder.with_clock(clock.clone()).build().unwrap();
        (limiter, clock)
    }

    #[test]
    fn test_fixed_window_basic() {
        let (limiter, _clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(1)
                .with_interval(Duration::from_secs(1))
                .with_overflow_message("overflow"),
        );

        assert!(!limiter.reached("key"));
        assert_eq!(limiter.overflow_message(), None);

        assert!(limiter.reached("key"));
        assert_eq!(limiter.overflow_message().as_deref(), Some("overflow"));

        assert!(limiter.reached("key"));
        assert_eq!(limiter.overflow_message(), None);
    }

    #[test]
    fn test_limit_th_call_allowed() {
        let (limiter, _clock) = limiter_with_clock(RateLimiter::builder().with_limit(100));

        for i in 1..=100 {
            assert!(!limiter.reached("key"), "call {} should be allowed", i);
        }
        assert!(limiter.reached("key"));
    }

    #[test]
    fn test_interval_expiry_restarts_window() {
        let (limiter, clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(1)
                .with_interval(Duration::from_millis(10)),
        );

        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));

        clock.advance(Duration::from_millis(11));
        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));
    }

    #[test]
    fn test_no_interval_is_lifetime_counter() {
        let (limiter, clock) = limiter_with_clock(RateLimiter::builder().with_limit(2));

        assert!(!limiter.reached("key"));
        assert!(!limiter.reached("key"));
        clock.advance(Duration::from_secs(86_400));
        assert!(limiter.reached("key"));
    }

    #[test]
    fn test_disabled_limiter_allows_everything() {
        let (limiter, _clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_interval(Duration::from_secs(1))
                .with_overflow_message("never"),
        );

        for _ in 0..10_000 {
            assert!(!limiter.reached("key"));
            assert_eq!(limiter.overflow_message(), None);
        }
        assert!(limiter.is_empty());
        assert_eq!(limiter.metrics().events_allowed(), 10_000);
    }

    #[test]
    fn test_zero_limit_suppresses_first_call() {
        let (limiter, _clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(0)
                .with_overflow_message("overflow"),
        );

        assert!(limiter.reached("key"));
        assert_eq!(limiter.overflow_message().as_deref(), Some("overflow"));
        assert!(limiter.reached("key"));
        assert_eq!(limiter.overflow_message(), None);
    }

    #[test]
    fn test_zero_interval_never_accumulates() {
        let (limiter, _clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(1)
                .with_interval(Duration::ZERO),
        );

        for _ in 0..10 {
            assert!(!limiter.reached("key"));
        }
    }

    #[test]
    fn test_sliding_window_capacity_restored() {
        let (limiter, clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(2)
                .with_interval(Duration::from_millis(100))
                .sliding(true),
        );

        assert!(!limiter.reached("key"));
        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));

        clock.advance(Duration::from_millis(101));
        assert!(!limiter.reached("key"));
        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));
    }

    #[test]
    fn test_sliding_window_rolls() {
        let (limiter, clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(2)
                .with_interval(Duration::from_millis(100))
                .sliding(true),
        );

        assert!(!limiter.reached("key"));
        clock.advance(Duration::from_millis(50));
        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));

        // Only the first admission has left the window
        clock.advance(Duration::from_millis(51));
        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));
    }

    #[test]
    fn test_keys_are_independent() {
        let (limiter, _clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(1)
                .with_overflow_message("overflow"),
        );

        assert!(!limiter.reached("a"));
        assert!(!limiter.reached("b"));

        let a = limiter.check("a");
        assert!(a.is_suppressed());
        assert_eq!(a.overflow_message(), Some("overflow"));

        // Interleaved activity on another key does not steal a's edge
        let b = limiter.check("b");
        assert_eq!(b.overflow_message(), Some("overflow"));
        assert_eq!(limiter.check("a").overflow_message(), None);
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn test_check_carries_edge() {
        let (limiter, clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(2)
                .with_interval(Duration::from_secs(1))
                .with_overflow_message("overflow"),
        );

        let messages: Vec<_> = (0..6)
            .map(|_| limiter.check("key").into_overflow_message())
            .collect();
        assert_eq!(messages.iter().filter(|m| m.is_some()).count(), 1);
        assert!(messages[2].is_some());

        // Admitted again after expiry, then the next run yields a new notice
        clock.advance(Duration::from_secs(2));
        assert!(limiter.check("key").is_allowed());
        assert!(limiter.check("key").is_allowed());
        assert_eq!(limiter.check("key").overflow_message(), Some("overflow"));
        assert_eq!(limiter.metrics().overflow_notices(), 2);
    }

    #[test]
    fn test_edge_without_message() {
        let (limiter, _clock) = limiter_with_clock(RateLimiter::builder().with_limit(1));

        assert!(!limiter.reached("key"));
        let verdict = limiter.check("key");
        assert_eq!(verdict.decision(), LimitDecision::Suppress);
        assert_eq!(verdict.overflow_message(), None);
        assert_eq!(limiter.overflow_message(), None);
        assert_eq!(limiter.metrics().overflow_notices(), 1);
    }

    #[test]
    fn test_reset_all_restores_fixed_counters() {
        let (limiter, _clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(1)
                .with_interval(Duration::from_secs(60)),
        );

        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));

        limiter.reset_all();
        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));
    }

    #[test]
    fn test_reset_all_leaves_sliding_buffers() {
        let (limiter, _clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(1)
                .with_interval(Duration::from_secs(60))
                .sliding(true),
        );

        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));

        limiter.reset_all();
        assert!(limiter.reached("key"));
        limiter.for_each_key(|_, state| {
            assert!(matches!(state.window(), WindowState::Sliding(w) if w.len() == 1));
        });
    }

    #[test]
    fn test_reset_all_on_empty_limiter() {
        let (limiter, _clock) = limiter_with_clock(RateLimiter::builder().with_limit(1));
        limiter.reset_all();
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_wipe_preserves_configuration() {
        let (limiter, clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(2)
                .with_interval(Duration::from_secs(1))
                .with_overflow_message("overflow"),
        );
        let before = limiter.config();

        for _ in 0..5 {
            limiter.reached("key");
        }
        limiter.wipe();
        assert!(limiter.is_empty());
        assert_eq!(limiter.config(), before);
        assert_eq!(limiter.overflow_message(), None);

        assert!(!limiter.reached("key"));
        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));
        assert_eq!(limiter.overflow_message().as_deref(), Some("overflow"));

        clock.advance(Duration::from_millis(1001));
        assert!(!limiter.reached("key"));
    }

    #[test]
    fn test_reconfigure_switches_mode_and_clears_state() {
        let (limiter, _clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(1)
                .with_interval(Duration::from_secs(1)),
        );

        assert!(!limiter.reached("key"));
        assert!(limiter.reached("key"));

        let config = RateLimiter::builder()
            .with_limit(3)
            .with_interval(Duration::from_secs(1))
            .sliding(true)
            .config()
            .unwrap();
        limiter.reconfigure(config);

        assert!(limiter.is_empty());
        for _ in 0..3 {
            assert!(!limiter.reached("key"));
        }
        assert!(limiter.reached("key"));
        limiter.for_each_key(|_, state| assert_eq!(state.mode(), LimitMode::SlidingWindow));
    }

    #[test]
    fn test_for_each_key_callback_may_reenter() {
        let (limiter, _clock) = limiter_with_clock(RateLimiter::builder().with_limit(1));
        assert!(!limiter.reached("a"));
        assert!(!limiter.reached("b"));

        let mut visited = 0;
        limiter.for_each_key(|key, _| {
            assert!(limiter.reached(key.as_str()));
            visited += 1;
        });
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_sliding_overflow_edge_once_per_run() {
        let (limiter, clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(2)
                .with_interval(Duration::from_secs(1))
                .sliding(true)
                .with_overflow_message("overflow"),
        );

        for run in 0..3 {
            assert!(limiter.check("key").is_allowed(), "run {}", run);
            assert!(limiter.check("key").is_allowed(), "run {}", run);

            let first = limiter.check("key");
            assert!(first.is_suppressed());
            assert_eq!(first.overflow_message(), Some("overflow"));

            for _ in 0..5 {
                assert!(limiter.reached("key"));
                assert_eq!(limiter.overflow_message(), None);
            }

            // Let both admissions leave the window
            clock.advance(Duration::from_millis(1001));
        }
        assert_eq!(limiter.metrics().overflow_notices(), 3);
    }

    #[test]
    fn test_exact_interval_survives_build() {
        let precise = Duration::new(100_000_000, 1);
        let limiter = RateLimiter::builder()
            .with_limit(1)
            .with_interval(precise)
            .build::<String>()
            .unwrap();
        assert_eq!(limiter.config().interval, Some(precise));

        let (limiter, clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(1)
                .with_interval(Duration::MAX),
        );
        assert_eq!(limiter.config().interval, Some(Duration::MAX));
        assert!(!limiter.reached("key"));
        clock.advance(Duration::from_secs(86_400 * 365));
        assert!(limiter.reached("key"));
    }

    #[test]
    fn test_build_rejects_bad_interval() {
        let result = RateLimiter::builder()
            .with_limit(1)
            .with_interval_in(-5.0, IntervalUnit::Minutes)
            .build::<String>();
        assert_eq!(result.unwrap_err(), ConfigError::InvalidInterval(-5.0));
    }

    #[test]
    fn test_interval_units_normalized() {
        let (limiter, clock) = limiter_with_clock(
            RateLimiter::builder()
                .with_limit(1)
                .with_interval_in(1.0, IntervalUnit::Minutes),
        );
        assert_eq!(limiter.config().interval, Some(Duration::from_secs(60)));

        assert!(!limiter.reached("key"));
        clock.advance(Duration::from_secs(59));
        assert!(limiter.reached("key"));
        clock.advance(Duration::from_secs(2));
        assert!(!limiter.reached("key"));
    }

    #[test]
    fn test_default_overflow_message() {
        let config = RateLimiter::builder()
            .or_default_overflow_message()
            .config()
            .unwrap();
        assert_eq!(
            config.overflow_message.as_deref(),
            Some(DEFAULT_OVERFLOW_MESSAGE)
        );

        let config = RateLimiter::builder()
            .with_overflow_message("custom")
            .or_default_overflow_message()
            .config()
            .unwrap();
        assert_eq!(config.overflow_message.as_deref(), Some("custom"));
    }

    #[test]
    fn test_concurrent_single_overflow_notice() {
        use std::thread;

        let limiter: RateLimiter<String> = RateLimiter::builder()
            .with_limit(50)
            .with_overflow_message("overflow")
            .build()
            .unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let limiter = limiter.clone();
                thread::spawn(move || {
                    let mut allowed = 0;
                    let mut notices = 0;
                    for _ in 0..20 {
                        let verdict = limiter.check("shared");
                        if verdict.is_allowed() {
                            allowed += 1;
                        }
                        if verdict.overflow_message().is_some() {
                            notices += 1;
                        }
                    }
                    (allowed, notices)
                })
            })
            .collect();

        let (mut allowed, mut notices) = (0, 0);
        for handle in handles {
            let (a, n) = handle.join().unwrap();
            allowed += a;
            notices += n;
        }

        assert_eq!(allowed, 50);
        assert_eq!(notices, 1);
        assert_eq!(limiter.metrics().events_suppressed(), 150);
    }
}
