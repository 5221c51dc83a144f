//! Keyed async mutexes.
//!
//! One lock per key (user id, document name), created on demand and dropped
//! again once nobody holds or waits for it.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A map of lazily created per-key mutexes.
pub struct KeyedLocks<K>
where
    K: Hash + Eq + Clone,
{
    locks: DashMap<K, Arc<Mutex<()>>>,
}

/// Holds the lock for one key until dropped.
pub struct KeyedGuard<'a, K>
where
    K: Hash + Eq + Clone,
{
    owner: &'a KeyedLocks<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K> KeyedLocks<K>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: K) -> KeyedGuard<'_, K> {
        // Clone under the shard lock so cleanup in Drop can't race with us
        let mutex = self.locks.entry(key.clone()).or_default().clone();
        let guard = mutex.lock_owned().await;

        KeyedGuard {
            owner: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or awaited.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.len()
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for KeyedGuard<'_, K>
where
    K: Hash + Eq + Clone,
{
    fn drop(&mut self) {
        // Release first, then forget the mutex if the map holds the only reference
        self.guard.take();
        self.owner
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_key_is_serialized() {
        let locks = Arc::new(KeyedLocks::<u64>::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let overlap = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            let overlap = overlap.clone();
            tasks.push(tokio::spawn(async move {
                let _guard = locks.lock(1).await;
                if inside.fetch_add(1, Ordering::SeqCst) > 0 {
                    overlap.fetch_add(1, Ordering::SeqCst);
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(overlap.load(Ordering::SeqCst), 0);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::<&'static str>::new();

        let _users = locks.lock("users").await;
        let stats = tokio::time::timeout(Duration::from_millis(50), locks.lock("stats")).await;

        assert!(stats.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_entry_dropped_after_release() {
        let locks = KeyedLocks::<u64>::new();
        {
            let _guard = locks.lock(5).await;
            assert_eq!(locks.len(), 1);
        }
        assert_eq!(locks.len(), 0);
    }
}
