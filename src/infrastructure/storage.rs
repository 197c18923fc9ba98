//! Storage implementations for per-key state.
//!
//! Provides concurrent, sharded storage for tracking throttling state.

use crate::application::ports::Storage;
use dashmap::DashMap;
use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Thread-safe sharded storage backed by DashMap.
///
/// Each key lives in one shard; the shard's lock guards both lazy creation
/// and the read-modify-write done by the limiter, so keys in different
/// shards never contend.
#[derive(Debug)]
pub struct ShardedStorage<K, V>
where
    K: Eq + Hash,
{
    map: DashMap<K, V>,
}

impl<K, V> ShardedStorage<K, V>
where
    K: Eq + Hash,
{
    /// Create a new sharded storage instance.
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    /// Get a reference to a value.
    pub fn get<Q>(&self, key: &Q) -> Option<dashmap::mapref::one::Ref<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key)
    }

    /// Check if a key exists.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }
}

impl<K, V> Default for ShardedStorage<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Storage<K, V> for ShardedStorage<K, V>
where
    K: Hash + Eq + Send + Sync + Debug,
    V: Send + Sync + Debug,
{
    fn with_entry_mut<Q, F, R>(&self, key: &Q, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(&mut V) -> R,
    {
        // Known keys skip the allocation of an owned key
        if let Some(mut value) = self.map.get_mut(key) {
            return accessor(&mut value);
        }

        let mut value = self.map.entry(key.to_owned()).or_insert_with(factory);
        accessor(&mut value)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn clear(&self) {
        self.map.clear()
    }

    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for entry in self.map.iter() {
            f(entry.key(), entry.value());
        }
    }

    fn for_each_mut<F>(&self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        self.map.retain(|key, value| {
            f(key, value);
            true
        });
    }
}

// Implement Storage for Arc<ShardedStorage> so limiter clones share one map
impl<K, V> Storage<K, V> for Arc<ShardedStorage<K, V>>
where
    K: Hash + Eq + Send + Sync + Debug,
    V: Send + Sync + Debug,
{
    fn with_entry_mut<Q, F, R>(&self, key: &Q, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_entry_mut(key, factory, accessor)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V),
    {
        (**self).for_each(f)
    }

    fn for_each_mut<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V),
    {
        (**self).for_each_mut(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_entry_mut_creates_once() {
        let storage: ShardedStorage<String, u32> = ShardedStorage::new();

        let first = storage.with_entry_mut("key", || 10, |v| {
            *v += 1;
            *v
        });
        let second = storage.with_entry_mut("key", || 10, |v| {
            *v += 1;
            *v
        });

        assert_eq!(first, 11);
        assert_eq!(second, 12);
        assert_eq!(storage.len(), 1);
        assert!(storage.contains_key("key"));
        assert_eq!(*storage.get("key").unwrap(), 12);
    }

    #[test]
    fn test_clear() {
        let storage: ShardedStorage<String, u32> = ShardedStorage::new();

        storage.with_entry_mut("key1", || 1, |_| ());
        storage.with_entry_mut("key2", || 2, |_| ());
        assert_eq!(storage.len(), 2);

        storage.clear();
        assert_eq!(storage.len(), 0);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_for_each_mut_updates_all() {
        let storage: ShardedStorage<String, u32> = ShardedStorage::new();
        for i in 0..5 {
            storage.with_entry_mut(format!("key_{}", i).as_str(), || i, |_| ());
        }

        storage.for_each_mut(|_, v| *v = 0);

        let mut total = 0;
        storage.for_each(|_, v| total += *v);
        assert_eq!(total, 0);
        assert_eq!(storage.len(), 5);
    }

    #[test]
    fn test_concurrent_creation() {
        use std::thread;

        let storage: Arc<ShardedStorage<String, u64>> = Arc::new(ShardedStorage::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let storage_clone = Arc::clone(&storage);
            let handle = thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("key_{}", j);
                    storage_clone.with_entry_mut(key.as_str(), || 0, |v| *v += 1);
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(storage.len(), 100);
        storage.for_each(|_, v| assert_eq!(*v, 10));
    }
}
