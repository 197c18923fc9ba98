//! Test doubles for infrastructure adapters.
//!
//! A controllable clock for the limiter and a capturing layer for the
//! tracing front-end.

pub mod clock;
pub mod layer;

pub use clock::MockClock;
pub use layer::{CapturedEvent, MockCaptureLayer};
