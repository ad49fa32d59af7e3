//! Tree building: one persisted [`DagObject`] per directory.
//!
//! Children are visited in the order the directory yields them. Each child is
//! stored first (files through the [`FileChunker`], subdirectories by
//! recursion) and becomes a [`Link`] carrying its name, root hash, logical
//! size and kind. Once every child is linked, the object is encoded, hashed
//! and written under that hash.

use mdag_crypto::HashPrimitive;
use mdag_store::KvStore;
use mdag_types::{ContentHash, DagObject, Link, LinkKind};
use tracing::{debug, info};

use crate::chunker::{FileChunker, StoredNode};
use crate::error::DagResult;
use crate::node::{DirNode, Node};

/// Builds and persists directory objects.
pub struct TreeBuilder<'s> {
    store: &'s dyn KvStore,
    chunker: FileChunker,
}

impl<'s> TreeBuilder<'s> {
    /// A builder writing to `store` with the default block size.
    pub fn new(store: &'s dyn KvStore) -> Self {
        Self {
            store,
            chunker: FileChunker::default(),
        }
    }

    /// Use a specific chunker for the files of this tree.
    pub fn with_chunker(mut self, chunker: FileChunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn chunker(&self) -> &FileChunker {
        &self.chunker
    }

    /// Store any node: files are chunked, directories are built.
    pub fn store_node(&self, node: &Node, hasher: &mut dyn HashPrimitive) -> DagResult<StoredNode> {
        match node {
            Node::File(file) => self.chunker.store_file(self.store, file.as_ref(), hasher),
            Node::Dir(dir) => self.build(dir.as_ref(), hasher),
        }
    }

    /// Recursively store `dir` and return its object's hash with the `tree`
    /// kind.
    ///
    /// Any failure below this directory fails the whole call; nothing partial
    /// is returned.
    pub fn build(&self, dir: &dyn DirNode, hasher: &mut dyn HashPrimitive) -> DagResult<StoredNode> {
        let mut tree = DagObject::new();
        for child in dir.children()? {
            let child = child?;
            let stored = self.store_node(&child, hasher)?;
            tree.links
                .push(Link::new(child.name(), stored.hash, child.size(), stored.kind));
        }

        let hash = persist_object(self.store, &tree, hasher)?;
        debug!(
            name = dir.name(),
            hash = %hash.short_hex(),
            links = tree.len(),
            "stored tree"
        );
        Ok(StoredNode {
            hash,
            kind: LinkKind::Tree,
            size: dir.size(),
        })
    }

    /// Store a whole tree rooted at `node`, logging one summary line.
    pub fn store_root(&self, node: &Node, hasher: &mut dyn HashPrimitive) -> DagResult<StoredNode> {
        let stored = self.store_node(node, hasher)?;
        info!(
            name = node.name(),
            root = %stored.hash,
            kind = %stored.kind,
            size = stored.size,
            hash = hasher.name(),
            "build complete"
        );
        Ok(stored)
    }
}

/// Encode, hash and write an object; return its hash.
pub(crate) fn persist_object(
    store: &dyn KvStore,
    object: &DagObject,
    hasher: &mut dyn HashPrimitive,
) -> DagResult<ContentHash> {
    let bytes = object.encode()?;
    let hash = hasher.digest(&bytes);
    store.put(&hash, &bytes)?;
    Ok(hash)
}
