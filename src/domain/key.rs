//! Event keys for the tracing front-end.
//!
//! A key identifies the throttling budget an event draws from. The front-end
//! derives it from the call-site or the rendered message, scoped by level and
//! target, or from a caller-supplied value shared across call-sites.

use ahash::AHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Hashed identity of a class of log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey(u64);

impl EventKey {
    /// Compute a key from the event's level, target and discriminator.
    ///
    /// The discriminator is whatever the key strategy selects: the
    /// call-site name or the message text.
    pub fn new(level: &str, target: &str, discriminator: &str) -> Self {
        let mut hasher = AHasher::default();
        0u8.hash(&mut hasher);
        level.hash(&mut hasher);
        target.hash(&mut hasher);
        discriminator.hash(&mut hasher);
        EventKey(hasher.finish())
    }

    /// Compute a key from a caller-chosen label.
    ///
    /// Events carrying the same label share one budget regardless of level,
    /// target or call-site.
    pub fn custom(label: &str) -> Self {
        let mut hasher = AHasher::default();
        1u8.hash(&mut hasher);
        label.hash(&mut hasher);
        EventKey(hasher.finish())
    }

    /// Wrap a raw hash value.
    pub fn from_u64(hash: u64) -> Self {
        EventKey(hash)
    }

    /// Get the raw hash value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
