use mdag_crypto::{HashAlgorithm, HashPrimitive};
use serde::{Deserialize, Serialize};

use crate::chunker::{FileChunker, BLOCK_SIZE};
use crate::error::{DagError, DagResult};

/// Build settings shared by the chunker and the tree builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DagConfig {
    /// Block size in bytes for chunking files.
    pub block_size: usize,
    /// Hash primitive used for every stored value.
    pub hash: HashAlgorithm,
}

impl Default for DagConfig {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            hash: HashAlgorithm::default(),
        }
    }
}

impl DagConfig {
    /// Reject settings the builder cannot work with.
    pub fn validate(&self) -> DagResult<()> {
        if self.block_size == 0 {
            return Err(DagError::InvalidConfig("block_size must be > 0".into()));
        }
        Ok(())
    }

    /// A chunker for the configured block size.
    pub fn chunker(&self) -> DagResult<FileChunker> {
        self.validate()?;
        FileChunker::with_block_size(self.block_size)
    }

    /// A fresh hasher for the configured algorithm.
    pub fn hasher(&self) -> Box<dyn HashPrimitive> {
        self.hash.primitive()
    }
}
