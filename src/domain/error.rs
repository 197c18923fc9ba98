//! Configuration errors.
//!
//! Throttling decisions never fail. The only ill-formed input is a malformed
//! interval, which is rejected when the limiter is built.

use thiserror::Error;

/// Error returned when a limiter configuration is invalid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The interval unit token is not one of seconds, minutes or hours
    #[error("unknown interval unit `{0}` (expected seconds, minutes or hours)")]
    UnknownUnit(String),

    /// The interval value is negative, NaN or infinite
    #[error("invalid interval {0}: must be a finite, non-negative number")]
    InvalidInterval(f64),
}
