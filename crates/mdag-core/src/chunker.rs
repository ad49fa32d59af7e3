//! File chunking.
//!
//! A file that fits in one block is stored as a single raw block (`blob`).
//! A larger file is split into fixed-size blocks, each stored under its own
//! hash, and threaded into a chain of [`BlockLink`]s (`list`). Blocks are
//! processed from the start of the file, and each block link points at the
//! link produced for the block before it, so the returned head is the link of
//! the *last* block. Reassembly walks the chain from the head and reverses it.

use mdag_crypto::HashPrimitive;
use mdag_store::KvStore;
use mdag_types::{BlockLink, ContentHash, LinkKind};
use tracing::{debug, trace};

use crate::error::{DagError, DagResult};
use crate::node::FileNode;

/// Default block size: 256 KiB.
pub const BLOCK_SIZE: usize = 256 * 1024;

/// Result of storing a file or a directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredNode {
    /// Root hash: the raw block, the chain head or the tree object.
    pub hash: ContentHash,
    /// How the node was stored.
    pub kind: LinkKind,
    /// Logical size in bytes.
    pub size: u64,
}

/// Splits files into blocks and writes them to a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileChunker {
    block_size: usize,
}

impl Default for FileChunker {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
        }
    }
}

impl FileChunker {
    /// A chunker using [`BLOCK_SIZE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A chunker with a custom block size. Zero is rejected.
    pub fn with_block_size(block_size: usize) -> DagResult<Self> {
        if block_size == 0 {
            return Err(DagError::InvalidConfig("block size must be > 0".into()));
        }
        Ok(Self { block_size })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks a file of `size` bytes occupies. An empty file still
    /// occupies one (empty) block.
    pub fn block_count(&self, size: u64) -> u64 {
        size.div_ceil(self.block_size as u64).max(1)
    }

    /// `blob` for single-block files, `list` otherwise.
    pub fn classify(&self, size: u64) -> LinkKind {
        if size > self.block_size as u64 {
            LinkKind::List
        } else {
            LinkKind::Blob
        }
    }

    /// Chunk and store a file node.
    ///
    /// The content must be exactly as long as the declared size; a mismatch
    /// is reported before anything is written.
    pub fn store_file(
        &self,
        store: &dyn KvStore,
        file: &dyn FileNode,
        hasher: &mut dyn HashPrimitive,
    ) -> DagResult<StoredNode> {
        let content = file.content()?;
        let declared = file.size();
        if content.len() as u64 != declared {
            return Err(DagError::SizeMismatch {
                name: file.name().to_string(),
                declared,
                actual: content.len() as u64,
            });
        }
        let stored = self.store_bytes(store, &content, hasher)?;
        debug!(
            name = file.name(),
            hash = %stored.hash.short_hex(),
            kind = %stored.kind,
            size = stored.size,
            "stored file"
        );
        Ok(stored)
    }

    /// Chunk and store raw content.
    ///
    /// Store failures propagate immediately. Blocks written before the
    /// failure stay in the store; they are addressed by their own content.
    pub fn store_bytes(
        &self,
        store: &dyn KvStore,
        content: &[u8],
        hasher: &mut dyn HashPrimitive,
    ) -> DagResult<StoredNode> {
        let size = content.len() as u64;
        if self.classify(size) == LinkKind::Blob {
            let hash = hasher.digest(content);
            store.put(&hash, content)?;
            return Ok(StoredNode {
                hash,
                kind: LinkKind::Blob,
                size,
            });
        }

        let (first, rest) = content.split_at(self.block_size);
        let mut head = store_block(store, first, None, hasher)?;
        for block in rest.chunks(self.block_size) {
            head = store_block(store, block, Some(head), hasher)?;
        }
        Ok(StoredNode {
            hash: head,
            kind: LinkKind::List,
            size,
        })
    }
}

/// Store one block and the block link pointing from it to `next`; return the
/// block link's hash.
fn store_block(
    store: &dyn KvStore,
    block: &[u8],
    next: Option<ContentHash>,
    hasher: &mut dyn HashPrimitive,
) -> DagResult<ContentHash> {
    let block_hash = hasher.digest(block);
    store.put(&block_hash, block)?;

    let encoded = BlockLink::new(block_hash, next).to_bytes();
    let link_hash = hasher.digest(&encoded);
    store.put(&link_hash, &encoded)?;
    trace!(link = %link_hash.short_hex(), len = block.len(), "stored block");
    Ok(link_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemFile;
    use crate::testutil::FailingStore;
    use mdag_crypto::{Blake3Hasher, Sha256Hasher};
    use mdag_store::InMemoryKvStore;
    use proptest::prelude::*;

    fn chain(store: &InMemoryKvStore, head: &ContentHash) -> Vec<BlockLink> {
        let mut links = Vec::new();
        let mut cur = Some(head.clone());
        while let Some(hash) = cur {
            let link = BlockLink::from_bytes(&store.get(&hash).unwrap().unwrap()).unwrap();
            cur = link.next.clone();
            links.push(link);
        }
        links
    }

    #[test]
    fn block_count_rounds_up() {
        let c = FileChunker::with_block_size(4).unwrap();
        assert_eq!(c.block_count(0), 1);
        assert_eq!(c.block_count(1), 1);
        assert_eq!(c.block_count(4), 1);
        assert_eq!(c.block_count(5), 2);
        assert_eq!(c.block_count(12), 3);
        assert_eq!(FileChunker::new().block_count(BLOCK_SIZE as u64 + 1), 2);
    }

    #[test]
    fn zero_block_size_is_rejected() {
        assert!(matches!(
            FileChunker::with_block_size(0),
            Err(DagError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_file_is_single_empty_blob() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let stored = FileChunker::new().store_bytes(&store, b"", &mut h).unwrap();
        assert_eq!(stored.kind, LinkKind::Blob);
        assert_eq!(stored.hash, h.digest(b""));
        assert_eq!(store.get(&stored.hash).unwrap(), Some(Vec::new()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn single_block_returns_raw_block_hash() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let content = vec![7u8; BLOCK_SIZE];
        let stored = FileChunker::new().store_bytes(&store, &content, &mut h).unwrap();
        assert_eq!(stored.kind, LinkKind::Blob);
        assert_eq!(stored.hash, h.digest(&content));
        assert_eq!(store.get(&stored.hash).unwrap().unwrap(), content);
    }

    #[test]
    fn multi_block_builds_reversed_chain() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let chunker = FileChunker::with_block_size(4).unwrap();
        let stored = chunker.store_bytes(&store, b"aaaabbbbcc", &mut h).unwrap();
        assert_eq!(stored.kind, LinkKind::List);
        assert_eq!(stored.size, 10);

        let links = chain(&store, &stored.hash);
        assert_eq!(links.len(), 3);
        // Head is the last block; the tail (no next) is the first block.
        assert_eq!(links[0].block_hash, h.digest(b"cc"));
        assert_eq!(links[1].block_hash, h.digest(b"bbbb"));
        assert_eq!(links[2].block_hash, h.digest(b"aaaa"));
        assert!(links[2].next.is_none());
    }

    #[test]
    fn head_hash_is_hash_of_encoded_link() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let chunker = FileChunker::with_block_size(2).unwrap();
        let stored = chunker.store_bytes(&store, b"abcd", &mut h).unwrap();

        let first = BlockLink::new(h.digest(b"ab"), None);
        let first_hash = h.digest(&first.to_bytes());
        let second = BlockLink::new(h.digest(b"cd"), Some(first_hash));
        assert_eq!(stored.hash, h.digest(&second.to_bytes()));
    }

    #[test]
    fn identical_blocks_are_stored_once() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let chunker = FileChunker::with_block_size(4).unwrap();
        chunker.store_bytes(&store, b"xxxxxxxxxxxx", &mut h).unwrap();
        // One distinct block plus three distinct links (their `next` differs).
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn store_file_checks_declared_size() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let file = MemFile::new("short", b"abc".to_vec()).with_declared_size(4);
        let err = FileChunker::new().store_file(&store, &file, &mut h).unwrap_err();
        assert!(matches!(
            err,
            DagError::SizeMismatch { declared: 4, actual: 3, .. }
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn hash_primitive_is_pluggable() {
        let store = InMemoryKvStore::new();
        let chunker = FileChunker::with_block_size(4).unwrap();
        let a = chunker
            .store_bytes(&store, b"0123456789", &mut Blake3Hasher::new())
            .unwrap();
        let b = chunker
            .store_bytes(&store, b"0123456789", &mut Sha256Hasher::new())
            .unwrap();
        assert_ne!(a.hash, b.hash);
        assert_eq!(chain(&store, &b.hash).len(), 3);
    }

    #[test]
    fn write_failure_propagates() {
        let store = FailingStore::after(2);
        let mut h = Blake3Hasher::new();
        let chunker = FileChunker::with_block_size(4).unwrap();
        let err = chunker.store_bytes(&store, b"aaaabbbbcccc", &mut h).unwrap_err();
        assert!(matches!(err, DagError::Store(_)));
        // Writes that happened before the failure are kept.
        assert_eq!(store.inner().len(), 2);
    }

    proptest! {
        #[test]
        fn chain_length_matches_block_count(len in 0usize..200, bs in 1usize..32) {
            let store = InMemoryKvStore::new();
            let mut h = Blake3Hasher::new();
            let chunker = FileChunker::with_block_size(bs).unwrap();
            let content: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let stored = chunker.store_bytes(&store, &content, &mut h).unwrap();
            let expected = chunker.block_count(len as u64);
            if expected == 1 {
                prop_assert_eq!(stored.kind, LinkKind::Blob);
            } else {
                prop_assert_eq!(stored.kind, LinkKind::List);
                prop_assert_eq!(chain(&store, &stored.hash).len() as u64, expected);
            }
        }
    }
}
