//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use mdag_store::{InMemoryKvStore, KvStore, StoreError, StoreResult};
use mdag_types::ContentHash;

/// Accepts a fixed number of writes, then fails every later one.
pub struct FailingStore {
    inner: InMemoryKvStore,
    remaining: AtomicUsize,
}

impl FailingStore {
    pub fn after(writes: usize) -> Self {
        Self {
            inner: InMemoryKvStore::new(),
            remaining: AtomicUsize::new(writes),
        }
    }

    pub fn inner(&self) -> &InMemoryKvStore {
        &self.inner
    }
}

impl KvStore for FailingStore {
    fn put(&self, key: &ContentHash, value: &[u8]) -> StoreResult<()> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left == 0 {
            return Err(StoreError::Backend("injected write failure".into()));
        }
        self.remaining.store(left - 1, Ordering::SeqCst);
        self.inner.put(key, value)
    }

    fn get(&self, key: &ContentHash) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }
}
