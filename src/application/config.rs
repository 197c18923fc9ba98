//! Limiter configuration.
//!
//! `LimiterConfig` is the normalized form a limiter runs with.
//! `LimiterSettings` is the form read from configuration files: it mirrors
//! the user-facing options (`limit`, `interval`, `sliding`, `message`) and is
//! validated when turned into a limiter.

use crate::application::limiter::RateLimiterBuilder;
use crate::domain::error::ConfigError;
use crate::domain::interval::IntervalSpec;
use crate::domain::key_state::{LimitMode, WindowBounds};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Overflow notice used by the tracing front-end when none is configured.
pub const DEFAULT_OVERFLOW_MESSAGE: &str = "Overflow, future logs will be suppressed";

/// Normalized limiter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LimiterConfig {
    /// Maximum admissions per window; `None` disables limiting
    pub limit: Option<u64>,
    /// Window length; `None` never expires
    pub interval: Option<Duration>,
    /// Fixed or sliding window
    pub mode: LimitMode,
    /// Returned once per overflow transition
    pub overflow_message: Option<Arc<str>>,
}

impl LimiterConfig {
    /// Window bounds, or `None` when limiting is disabled.
    pub fn bounds(&self) -> Option<WindowBounds> {
        self.limit
            .map(|limit| WindowBounds::new(limit, self.interval))
    }

    /// Check whether limiting is enabled.
    pub fn is_enabled(&self) -> bool {
        self.limit.is_some()
    }
}

/// Deserializable limiter options.
///
/// ```
/// use log_limiter::{LimiterSettings, RateLimiter};
///
/// let settings: LimiterSettings = serde_json::from_str(
///     r#"{ "limit": 10, "interval": { "value": 1, "unit": "m" }, "message": "throttled" }"#,
/// )
/// .unwrap();
///
/// let limiter: RateLimiter<String> = settings.into_builder().build().unwrap();
/// assert_eq!(limiter.config().limit, Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimiterSettings {
    /// Maximum admissions per window
    pub limit: Option<u64>,
    /// Window length as seconds or `{ value, unit }`
    pub interval: Option<IntervalSpec>,
    /// Use sliding-window semantics
    pub sliding: bool,
    /// Overflow notice
    pub message: Option<String>,
}

impl LimiterSettings {
    /// Convert into a builder carrying these options.
    pub fn into_builder(self) -> RateLimiterBuilder {
        let mut builder = RateLimiterBuilder::default().sliding(self.sliding);
        if let Some(limit) = self.limit {
            builder = builder.with_limit(limit);
        }
        if let Some(interval) = self.interval {
            builder = builder.with_interval_spec(interval);
        }
        if let Some(message) = self.message {
            builder = builder.with_overflow_message(message);
        }
        builder
    }

    /// Validate and normalize into a `LimiterConfig`.
    ///
    /// # Errors
    /// Returns `ConfigError` if the interval is malformed.
    pub fn to_config(&self) -> Result<LimiterConfig, ConfigError> {
        self.clone().into_builder().config()
    }
}
