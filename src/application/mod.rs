//! Application layer - orchestration of the window logic.
//!
//! This layer owns the runtime behavior:
//! - Rate limiter (per-key decisions and overflow edges)
//! - Configuration (builder options and deserializable settings)
//! - Metrics (allowed, suppressed and overflow counters)
//!
//! ## Ports
//!
//! Clock and storage are traits implemented by the infrastructure layer, so
//! tests can substitute a controllable clock.

pub mod config;
pub mod limiter;
pub mod metrics;
pub mod ports;
