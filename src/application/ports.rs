//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Port for obtaining current time.
///
/// Only elapsed time matters to the limiter, so the clock is monotonic.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for concurrent per-key storage.
///
/// Implementations must make `with_entry_mut` atomic per key: lazy creation
/// and the accessor run under the same lock, so two callers racing on an
/// unseen key observe a single entry.
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry with mutable access, creating it if necessary.
    ///
    /// # Arguments
    /// * `key` - The key to look up; only cloned into the map on first use
    /// * `factory` - Function to create a new value if the key doesn't exist
    /// * `accessor` - Function that gets mutable access to the value
    ///
    /// # Returns
    /// The result from the accessor function
    fn with_entry_mut<Q, F, R>(&self, key: &Q, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(&mut V) -> R;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries from the storage.
    fn clear(&self);

    /// Iterate over all entries, providing access to both key and value.
    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V);

    /// Iterate over all entries with mutable access to the values.
    fn for_each_mut<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V);
}
