use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of async mutexes, one per aggregate key
///
/// Team mutations are keyed by owner id (a user owns at most one team),
/// player mutations by player id. Unrelated keys never contend. An entry
/// lives only while some task holds or waits on its key.
#[derive(Default)]
pub struct KeyedLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

/// Exclusive access to one key; releasing it drops the registry entry
/// when no other task is queued on the same key
pub struct KeyGuard<'a> {
    key: i64,
    locks: &'a KeyedLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // release first so our own Arc no longer counts
        self.guard.take();
        self.locks.release(self.key);
    }
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: i64) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(key).or_default())
    }

    // The shard lock held by remove_if excludes a concurrent entry() clone.
    fn release(&self, key: i64) {
        self.locks
            .remove_if(&key, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    /// Waits for exclusive access to `key`
    pub async fn lock(&self, key: i64) -> KeyGuard<'_> {
        let guard = self.entry(key).lock_owned().await;
        KeyGuard {
            key,
            locks: self,
            guard: Some(guard),
        }
    }

    /// Locks two keys in ascending order
    ///
    /// Returns a single guard when both ids are equal.
    pub async fn lock_pair(&self, a: i64, b: i64) -> Vec<KeyGuard<'_>> {
        if a == b {
            return vec![self.lock(a).await];
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first = self.lock(first).await;
        let second = self.lock(second).await;
        vec![first, second]
    }

    /// Number of keys currently held or awaited
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
