use mdag_types::ContentHash;

use crate::error::StoreResult;

/// Content-addressed key/value store.
///
/// All implementations must satisfy these invariants:
/// - Keys are exactly the content hashes computed by the caller. The store
///   performs no validation that a value hashes to its key.
/// - Values are immutable once written; writing an existing key again is a
///   no-op that still succeeds.
/// - All I/O errors are propagated, never silently ignored.
pub trait KvStore: Send + Sync {
    /// Write `value` under `key`.
    fn put(&self, key: &ContentHash, value: &[u8]) -> StoreResult<()>;

    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    /// Returns `Err` on I/O failure.
    fn get(&self, key: &ContentHash) -> StoreResult<Option<Vec<u8>>>;

    /// Check whether a key exists in the store.
    ///
    /// Default implementation reads the value. Backends may override for
    /// better performance.
    fn contains(&self, key: &ContentHash) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn put(&self, key: &ContentHash, value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &ContentHash) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn contains(&self, key: &ContentHash) -> StoreResult<bool> {
        (**self).contains(key)
    }
}

impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    fn put(&self, key: &ContentHash, value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &ContentHash) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn contains(&self, key: &ContentHash) -> StoreResult<bool> {
        (**self).contains(key)
    }
}
