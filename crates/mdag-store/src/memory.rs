use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use mdag_types::ContentHash;
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

/// In-memory, HashMap-based key/value store.
///
/// Intended for tests and embedding. All values are held in memory behind a
/// `RwLock` for safe concurrent access. Values are cloned on read/write.
pub struct InMemoryKvStore {
    values: RwLock<HashMap<ContentHash, Vec<u8>>>,
    puts: AtomicU64,
}

impl InMemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            puts: AtomicU64::new(0),
        }
    }

    /// Number of distinct keys currently stored.
    pub fn len(&self) -> usize {
        self.values.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored values.
    pub fn total_bytes(&self) -> u64 {
        self.values
            .read()
            .expect("lock poisoned")
            .values()
            .map(|v| v.len() as u64)
            .sum()
    }

    /// Number of `put` calls so far, including ones for keys already present.
    pub fn put_count(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> Vec<ContentHash> {
        let map = self.values.read().expect("lock poisoned");
        let mut keys: Vec<ContentHash> = map.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryKvStore {
    fn put(&self, key: &ContentHash, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.puts.fetch_add(1, Ordering::Relaxed);
        let mut map = self.values.write().expect("lock poisoned");
        // Content addressing: an existing key already holds this value.
        map.entry(key.clone()).or_insert_with(|| value.to_vec());
        trace!(key = %key.short_hex(), len = value.len(), "put");
        Ok(())
    }

    fn get(&self, key: &ContentHash) -> StoreResult<Option<Vec<u8>>> {
        let map = self.values.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn contains(&self, key: &ContentHash) -> StoreResult<bool> {
        let map = self.values.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKvStore")
            .field("key_count", &self.len())
            .field("put_count", &self.put_count())
            .finish()
    }
}
