//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - Storage implementations (sharded maps)
//! - Tracing integration (per-layer filter)

pub mod clock;
pub mod layer;
pub mod storage;
pub(crate) mod visitor;

/// Mock implementations for testing.
///
/// Available during test builds or with the `test-helpers` feature:
/// ```toml
/// [dev-dependencies]
/// log-limiter = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
