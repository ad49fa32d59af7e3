//! On-disk key/value store: one file per key.
//!
//! Values live at `<root>/<first 2 hex chars>/<remaining hex chars>`. A value
//! is first written to a temporary file inside its shard directory and then
//! renamed into place, so readers never observe a partially written value.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use mdag_types::ContentHash;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

/// Directory-backed key/value store.
#[derive(Clone, Debug)]
pub struct FsKvStore {
    root: PathBuf,
}

impl FsKvStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened filesystem store");
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &ContentHash) -> PathBuf {
        let hex = key.to_hex();
        let (shard, rest) = hex.split_at(2.min(hex.len()));
        self.root.join(shard).join(if rest.is_empty() { "_" } else { rest })
    }
}

impl KvStore for FsKvStore {
    fn put(&self, key: &ContentHash, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let path = self.path_for(key);
        if path.exists() {
            trace!(key = %key.short_hex(), "already present");
            return Ok(());
        }
        let shard = path
            .parent()
            .ok_or_else(|| StoreError::Backend(format!("no shard directory for {}", path.display())))?;
        fs::create_dir_all(shard)?;

        let mut tmp = NamedTempFile::new_in(shard)?;
        tmp.write_all(value)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        trace!(key = %key.short_hex(), len = value.len(), "put");
        Ok(())
    }

    fn get(&self, key: &ContentHash) -> StoreResult<Option<Vec<u8>>> {
        if key.is_empty() {
            return Ok(None);
        }
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, key: &ContentHash) -> StoreResult<bool> {
        Ok(!key.is_empty() && self.path_for(key).is_file())
    }
}
