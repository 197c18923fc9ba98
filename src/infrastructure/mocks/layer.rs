//! Capturing layer for testing the tracing front-end.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Layer that records every event reaching it.
///
/// Put it behind a `ThrottleFilter` to observe which events got through.
#[derive(Clone, Default)]
pub struct MockCaptureLayer {
    captured: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// An event seen by `MockCaptureLayer`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl MockCaptureLayer {
    /// Create an empty capture layer.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CapturedEvent>> {
        self.captured.lock().expect(
            "MockCaptureLayer mutex poisoned - a test thread panicked while holding the lock",
        )
    }

    /// All captured events, in order.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.lock().clone()
    }

    /// Messages of all captured events, in order.
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    /// Number of captured events.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Forget captured events.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<S> Layer<S> for MockCaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);

        let metadata = event.metadata();
        self.lock().push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.0,
        });
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}
