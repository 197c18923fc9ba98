//! Tracing integration.
//!
//! Provides `ThrottleFilter`, a per-layer `tracing_subscriber` filter that
//! keys each event, asks the limiter whether it may pass, and hands the
//! one-shot overflow notice to a user-supplied handler.

use crate::application::{
    limiter::{RateLimiter, RateLimiterBuilder, Verdict},
    metrics::Metrics,
};
use crate::domain::{error::ConfigError, key::EventKey};
use crate::infrastructure::visitor::FieldValueVisitor;

use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Filter};

/// How events are grouped into throttling budgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyBy {
    /// One budget per call-site (level, target and source location)
    #[default]
    Callsite,
    /// One budget per rendered message, per level and target
    Message,
    /// One budget per value of the named field, shared across call-sites.
    ///
    /// Events without the field fall back to their call-site.
    Field(String),
}

/// Overflow notice handed to the handler on an overflow edge.
#[derive(Debug, Clone, Copy)]
pub struct OverflowNotice<'a> {
    /// The configured overflow message
    pub message: &'a str,
    /// Key of the budget that overflowed
    pub key: EventKey,
    /// Level of the first suppressed event
    pub level: Level,
    /// Target of the first suppressed event
    pub target: &'a str,
}

/// Callback receiving overflow notices.
///
/// Runs inside the subscriber's event dispatch, so it should write the
/// notice out directly rather than emit another tracing event.
pub type OverflowHandler = Arc<dyn Fn(&OverflowNotice<'_>) + Send + Sync + 'static>;

/// Handler writing each notice to stderr as a log line.
///
/// Used by `ThrottleFilter` when no other handler is configured.
pub fn stderr_overflow_handler() -> OverflowHandler {
    Arc::new(|notice: &OverflowNotice<'_>| {
        // Nowhere to report a failed write to stderr
        let _ = writeln!(std::io::stderr().lock(), "{}", render_notice(notice));
    })
}

fn render_notice(notice: &OverflowNotice<'_>) -> String {
    format!("{:>5} {}: {}", notice.level.as_str(), notice.target, notice.message)
}

/// Builder for constructing a `ThrottleFilter`.
pub struct ThrottleFilterBuilder {
    limiter: RateLimiterBuilder,
    key_by: KeyBy,
    exempt_targets: BTreeSet<String>,
    overflow_handler: Option<OverflowHandler>,
}

impl ThrottleFilterBuilder {
    /// Set the limiter options.
    ///
    /// If the options carry no overflow message, `DEFAULT_OVERFLOW_MESSAGE`
    /// is used.
    pub fn with_limiter(mut self, limiter: RateLimiterBuilder) -> Self {
        self.limiter = limiter;
        self
    }

    /// Choose how events are keyed.
    pub fn key_by(mut self, key_by: KeyBy) -> Self {
        self.key_by = key_by;
        self
    }

    /// Exempt targets from throttling.
    ///
    /// Targets are matched exactly. Duplicates and empty names are dropped.
    pub fn with_exempt_targets(mut self, targets: Vec<String>) -> Self {
        self.exempt_targets = targets.into_iter().filter(|t| !t.is_empty()).collect();
        self
    }

    /// Set the handler receiving overflow notices.
    ///
    /// Without one, notices are written to stderr by
    /// `stderr_overflow_handler`.
    pub fn on_overflow(mut self, handler: OverflowHandler) -> Self {
        self.overflow_handler = Some(handler);
        self
    }

    /// Build the filter.
    ///
    /// # Errors
    /// Returns `ConfigError` if the limiter interval is malformed.
    pub fn build(self) -> Result<ThrottleFilter, ConfigError> {
        let limiter = self.limiter.or_default_overflow_message().build()?;

        Ok(ThrottleFilter {
            limiter,
            key_by: Arc::new(self.key_by),
            exempt_targets: Arc::new(self.exempt_targets),
            overflow_handler: self
                .overflow_handler
                .unwrap_or_else(stderr_overflow_handler),
        })
    }
}

/// Per-layer filter that throttles repeated events.
///
/// Clones share the same limiter.
///
/// # Example
/// ```no_run
/// use log_limiter::{OverflowNotice, RateLimiter, ThrottleFilter};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tracing_subscriber::prelude::*;
///
/// let throttle = ThrottleFilter::builder()
///     .with_limiter(
///         RateLimiter::builder()
///             .with_limit(10)
///             .with_interval(Duration::from_secs(60)),
///     )
///     .on_overflow(Arc::new(|notice: &OverflowNotice<'_>| {
///         eprintln!("{}", notice.message)
///     }))
///     .build()
///     .unwrap();
///
/// tracing_subscriber::registry()
///     .with(tracing_subscriber::fmt::layer().with_filter(throttle))
///     .init();
/// ```
#[derive(Clone)]
pub struct ThrottleFilter {
    limiter: RateLimiter<EventKey>,
    key_by: Arc<KeyBy>,
    exempt_targets: Arc<BTreeSet<String>>,
    overflow_handler: OverflowHandler,
}

impl ThrottleFilter {
    /// Create a builder for configuring the filter.
    ///
    /// Defaults: limiting disabled, call-site keys, no exempt targets,
    /// overflow notices written to stderr.
    pub fn builder() -> ThrottleFilterBuilder {
        ThrottleFilterBuilder {
            limiter: RateLimiterBuilder::default(),
            key_by: KeyBy::default(),
            exempt_targets: BTreeSet::new(),
            overflow_handler: None,
        }
    }

    /// Compute the key an event is throttled under.
    pub fn key_for(&self, event: &Event<'_>) -> EventKey {
        let metadata = event.metadata();
        let level = metadata.level().as_str();
        let target = metadata.target();

        match self.key_by.as_ref() {
            KeyBy::Callsite => EventKey::new(level, target, metadata.name()),
            KeyBy::Message => match field_value(event, "message") {
                Some(message) => EventKey::new(level, target, &message),
                None => EventKey::new(level, target, metadata.name()),
            },
            KeyBy::Field(name) => match field_value(event, name) {
                Some(label) => EventKey::custom(&label),
                None => EventKey::new(level, target, metadata.name()),
            },
        }
    }

    /// Decide on an event, notifying the overflow handler on an overflow edge.
    ///
    /// Returns whether the event may pass.
    pub fn should_allow(&self, event: &Event<'_>) -> bool {
        let metadata = event.metadata();

        if !self.exempt_targets.is_empty() && self.exempt_targets.contains(metadata.target()) {
            self.limiter.metrics().record_allowed();
            return true;
        }

        let key = self.key_for(event);
        let verdict: Verdict = self.limiter.check(&key);

        if let Some(message) = verdict.overflow_message() {
            (self.overflow_handler)(&OverflowNotice {
                message,
                key,
                level: *metadata.level(),
                target: metadata.target(),
            });
        }

        verdict.is_allowed()
    }

    /// Get a reference to the underlying limiter.
    ///
    /// Use it for administrative operations such as `reset_all` and `wipe`.
    pub fn limiter(&self) -> &RateLimiter<EventKey> {
        &self.limiter
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        self.limiter.metrics()
    }

    /// Number of keys currently tracked.
    pub fn key_count(&self) -> usize {
        self.limiter.len()
    }
}

impl fmt::Debug for ThrottleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrottleFilter")
            .field("limiter", &self.limiter)
            .field("key_by", &self.key_by)
            .field("exempt_targets", &self.exempt_targets)
            .field("overflow_handler", &"<fn>")
            .finish()
    }
}

fn field_value(event: &Event<'_>, name: &str) -> Option<String> {
    let mut visitor = FieldValueVisitor::new(name);
    event.record(&mut visitor);
    visitor.into_value()
}

impl<S> Filter<S> for ThrottleFilter
where
    S: Subscriber,
{
    fn enabled(&self, _meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        // Filtering happens per event in event_enabled
        true
    }

    fn event_enabled(&self, event: &Event<'_>, _cx: &Context<'_, S>) -> bool {
        self.should_allow(event)
    }
}
