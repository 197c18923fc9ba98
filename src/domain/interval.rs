//! Interval normalization.
//!
//! An interval can be given as a raw number of seconds or as a value paired
//! with a unit. Both forms are normalized once, at construction, to a
//! `Duration`; nothing downstream ever sees a unit again.

use crate::domain::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Unit in which an interval value is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum IntervalUnit {
    /// Seconds
    Seconds,
    /// Minutes (60 seconds)
    Minutes,
    /// Hours (3600 seconds)
    Hours,
}

impl IntervalUnit {
    /// Number of seconds in one unit.
    pub fn seconds(&self) -> f64 {
        match self {
            IntervalUnit::Seconds => 1.0,
            IntervalUnit::Minutes => 60.0,
            IntervalUnit::Hours => 3600.0,
        }
    }
}

impl FromStr for IntervalUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(IntervalUnit::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(IntervalUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(IntervalUnit::Hours),
            _ => Err(ConfigError::UnknownUnit(s.to_string())),
        }
    }
}

impl TryFrom<String> for IntervalUnit {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntervalUnit::Seconds => "seconds",
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Hours => "hours",
        };
        f.write_str(name)
    }
}

/// An interval as written in configuration.
///
/// Deserializes from either a bare number (seconds) or a
/// `{ "value": .., "unit": .. }` table.
///
/// # Example
/// ```
/// use log_limiter::{IntervalSpec, IntervalUnit};
/// use std::time::Duration;
///
/// let spec = IntervalSpec::with_unit(1.5, IntervalUnit::Minutes);
/// assert_eq!(spec.to_duration().unwrap(), Duration::from_secs(90));
///
/// let spec = IntervalSpec::seconds(0.25);
/// assert_eq!(spec.to_duration().unwrap(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IntervalSpec {
    /// A value already expressed in seconds
    Seconds(f64),
    /// A value paired with its unit
    WithUnit {
        /// Magnitude in `unit`
        value: f64,
        /// Unit of `value`
        unit: IntervalUnit,
    },
    /// An exact `Duration`, used as given
    #[serde(skip)]
    Exact(Duration),
}

impl IntervalSpec {
    /// An interval of `value` seconds.
    pub fn seconds(value: f64) -> Self {
        IntervalSpec::Seconds(value)
    }

    /// An interval of `value` in the given unit.
    pub fn with_unit(value: f64, unit: IntervalUnit) -> Self {
        IntervalSpec::WithUnit { value, unit }
    }

    /// Parse a `(value, unit token)` pair, e.g. `(5.0, "m")`.
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownUnit` if the token is not recognized.
    pub fn parse(value: f64, unit: &str) -> Result<Self, ConfigError> {
        Ok(IntervalSpec::WithUnit {
            value,
            unit: unit.parse()?,
        })
    }

    /// Normalize to a `Duration`.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidInterval` if the value is negative, not
    /// finite, or too large to represent.
    pub fn to_duration(&self) -> Result<Duration, ConfigError> {
        let (value, secs) = match *self {
            IntervalSpec::Seconds(value) => (value, value),
            IntervalSpec::WithUnit { value, unit } => (value, value * unit.seconds()),
            IntervalSpec::Exact(duration) => return Ok(duration),
        };

        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidInterval(value));
        }

        Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidInterval(value))
    }
}

impl From<Duration> for IntervalSpec {
    fn from(duration: Duration) -> Self {
        IntervalSpec::Exact(duration)
    }
}
