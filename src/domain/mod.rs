//! Domain layer - pure throttling logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of the limiter:
//! - Interval normalization (value + unit to a canonical `Duration`)
//! - Per-key window state (fixed counter or sliding timestamp buffer)
//! - Overflow edge detection
//! - Event keys for the tracing front-end
//!
//! All types in this layer are plain data and easily testable.

pub mod error;
pub mod interval;
pub mod key;
pub mod key_state;
