//! Stack-based accumulation for the top-level `add` entry point.
//!
//! A [`DagAccumulator`] holds one in-progress [`DagObject`] (a *frame*) per
//! directory on the current descent path. It is an owned value: each
//! traversal creates its own and threads it through by `&mut`, so two
//! traversals never share frames.
//!
//! Adding a file appends its link, and its head reference as a data entry, to
//! the top frame; nothing else is persisted for it. Adding a directory pushes
//! a frame, builds the directory with the [`TreeBuilder`], pops the frame,
//! persists it as a one-entry manifest naming the tree and only then links
//! the new tree into the parent frame (when there is one). The tree object
//! is the directory's authoritative representation; the manifest only points
//! at it.

use mdag_crypto::HashPrimitive;
use mdag_store::KvStore;
use mdag_types::{ContentHash, DagObject, Link, LinkKind};
use tracing::debug;

use crate::chunker::FileChunker;
use crate::error::{DagError, DagResult};
use crate::node::Node;
use crate::tree::{persist_object, TreeBuilder};

/// Explicit accumulation context for one traversal.
#[derive(Debug, Default)]
pub struct DagAccumulator {
    frames: Vec<DagObject>,
    chunker: FileChunker,
}

impl DagAccumulator {
    /// An empty accumulator using the default block size.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty accumulator using `chunker` for every file it stores.
    pub fn with_chunker(chunker: FileChunker) -> Self {
        Self {
            frames: Vec::new(),
            chunker,
        }
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The frame currently accepting entries.
    pub fn top(&self) -> Option<&DagObject> {
        self.frames.last()
    }

    /// Open a new, empty frame.
    pub fn push_frame(&mut self) {
        self.frames.push(DagObject::new());
    }

    /// Close the top frame and persist it as an object; return its hash.
    pub fn seal_frame(
        &mut self,
        store: &dyn KvStore,
        hasher: &mut dyn HashPrimitive,
    ) -> DagResult<ContentHash> {
        let frame = self.frames.pop().ok_or(DagError::EmptyStack)?;
        let hash = persist_object(store, &frame, hasher)?;
        debug!(hash = %hash.short_hex(), links = frame.len(), depth = self.depth(), "sealed frame");
        Ok(hash)
    }

    /// Add a node to the accumulation context.
    ///
    /// Files return `None`; they require an open frame and fail with
    /// [`DagError::EmptyStack`] otherwise, before anything is written.
    /// Directories return the hash of their persisted manifest.
    pub fn add(
        &mut self,
        store: &dyn KvStore,
        node: &Node,
        hasher: &mut dyn HashPrimitive,
    ) -> DagResult<Option<ContentHash>> {
        match node {
            Node::File(file) => {
                if self.frames.is_empty() {
                    return Err(DagError::EmptyStack);
                }
                let stored = self.chunker.store_file(store, file.as_ref(), hasher)?;
                let link = Link::new(file.name(), stored.hash.clone(), file.size(), stored.kind);
                if let Some(top) = self.frames.last_mut() {
                    top.push(link, stored.hash.into_bytes());
                }
                Ok(None)
            }
            Node::Dir(dir) => {
                self.push_frame();
                let built = TreeBuilder::new(store)
                    .with_chunker(self.chunker)
                    .build(dir.as_ref(), hasher);
                let mut frame = self.frames.pop().unwrap_or_default();
                let tree = built?;

                let link = Link::new(dir.name(), tree.hash.clone(), dir.size(), LinkKind::Tree);
                let head = tree.hash.into_bytes();
                frame.push(link.clone(), head.clone());

                // The parent only sees the directory once its manifest is stored.
                let hash = persist_object(store, &frame, hasher)?;
                if let Some(parent) = self.frames.last_mut() {
                    parent.push(link, head);
                }
                debug!(
                    name = dir.name(),
                    manifest = %hash.short_hex(),
                    depth = self.depth(),
                    "added directory"
                );
                Ok(Some(hash))
            }
        }
    }
}

/// Add `node` with a fresh accumulator.
///
/// Only directories can be added this way: a file needs an enclosing frame,
/// which a fresh accumulator does not have.
pub fn add(
    store: &dyn KvStore,
    node: &Node,
    hasher: &mut dyn HashPrimitive,
) -> DagResult<Option<ContentHash>> {
    DagAccumulator::new().add(store, node, hasher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::{MemDir, MemFile};
    use crate::testutil::FailingStore;
    use mdag_crypto::Blake3Hasher;
    use mdag_store::InMemoryKvStore;

    fn load(store: &InMemoryKvStore, hash: &ContentHash) -> DagObject {
        DagObject::decode(&store.get(hash).unwrap().unwrap()).unwrap()
    }

    fn file(name: &str, data: &[u8]) -> Node {
        Node::file(MemFile::new(name, data.to_vec()))
    }

    #[test]
    fn file_without_frame_is_rejected() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let err = add(&store, &file("f", b"x"), &mut h).unwrap_err();
        assert!(matches!(err, DagError::EmptyStack));
        assert!(store.is_empty());
    }

    #[test]
    fn seal_without_frame_is_rejected() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let err = DagAccumulator::new().seal_frame(&store, &mut h).unwrap_err();
        assert!(matches!(err, DagError::EmptyStack));
    }

    #[test]
    fn files_accumulate_into_top_frame() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let mut acc = DagAccumulator::new();
        acc.push_frame();
        assert_eq!(acc.add(&store, &file("a", b"alpha"), &mut h).unwrap(), None);
        assert_eq!(acc.add(&store, &file("b", b"bravo!"), &mut h).unwrap(), None);

        let top = acc.top().unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top.links[0].name, "a");
        assert_eq!(top.links[1].size, 6);
        assert_eq!(top.data[0], h.digest(b"alpha").into_bytes());

        let hash = acc.seal_frame(&store, &mut h).unwrap();
        assert_eq!(acc.depth(), 0);
        let sealed = load(&store, &hash);
        assert_eq!(sealed.links.len(), 2);
        assert_eq!(sealed.data.len(), 2);
    }

    #[test]
    fn directory_returns_manifest_naming_the_tree() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let dir = MemDir::new("d")
            .with_file("f", b"x".to_vec())
            .with_dir(MemDir::new("sub"));
        let tree = TreeBuilder::new(&store).build(&dir, &mut h).unwrap();

        let manifest_hash = add(&store, &Node::dir(dir), &mut h).unwrap().unwrap();
        assert_ne!(manifest_hash, tree.hash);

        let manifest = load(&store, &manifest_hash);
        assert_eq!(manifest.len(), 1);
        let link = &manifest.links[0];
        assert_eq!(link.name, "d");
        assert_eq!(link.hash, tree.hash);
        assert_eq!(link.size, 1);
        assert_eq!(link.kind, LinkKind::Tree);
        assert_eq!(manifest.data, vec![tree.hash.clone().into_bytes()]);
    }

    #[test]
    fn directory_links_into_parent_frame() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let mut acc = DagAccumulator::new();
        acc.push_frame();
        acc.add(&store, &file("readme", b"hi"), &mut h).unwrap();
        acc.add(&store, &Node::dir(MemDir::new("src").with_file("lib.rs", b"fn x(){}".to_vec())), &mut h)
            .unwrap();
        assert_eq!(acc.depth(), 1);

        let top = acc.top().unwrap();
        let names: Vec<&str> = top.links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["readme", "src"]);
        assert_eq!(top.links[1].kind, LinkKind::Tree);
        assert_eq!(top.links[1].size, 8);
    }

    #[test]
    fn stack_is_restored_after_failure() {
        let store = FailingStore::after(0);
        let mut h = Blake3Hasher::new();
        let mut acc = DagAccumulator::new();
        acc.push_frame();
        let dir = Node::dir(MemDir::new("d").with_file("f", b"x".to_vec()));
        assert!(acc.add(&store, &dir, &mut h).is_err());
        assert_eq!(acc.depth(), 1);
        assert!(acc.top().unwrap().is_empty());
    }

    #[test]
    fn parent_frame_untouched_when_manifest_write_fails() {
        // The blob and the tree object are written; the manifest is not.
        let store = FailingStore::after(2);
        let mut h = Blake3Hasher::new();
        let mut acc = DagAccumulator::new();
        acc.push_frame();
        let dir = Node::dir(MemDir::new("d").with_file("f", b"x".to_vec()));

        let err = acc.add(&store, &dir, &mut h).unwrap_err();
        assert!(matches!(err, DagError::Store(_)));
        assert_eq!(store.inner().len(), 2);
        assert_eq!(acc.depth(), 1);
        assert!(acc.top().unwrap().is_empty());
    }

    #[test]
    fn retry_after_failed_manifest_links_once() {
        let store = FailingStore::after(2);
        let mut h = Blake3Hasher::new();
        let mut acc = DagAccumulator::new();
        acc.push_frame();
        let dir = Node::dir(MemDir::new("d").with_file("f", b"x".to_vec()));
        assert!(acc.add(&store, &dir, &mut h).is_err());

        let healthy = InMemoryKvStore::new();
        acc.add(&healthy, &dir, &mut h).unwrap();
        assert_eq!(acc.top().unwrap().len(), 1);
    }

    #[test]
    fn repeated_add_is_deterministic() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let dir = Node::dir(MemDir::new("d").with_file("f", b"x".to_vec()));
        let first = add(&store, &dir, &mut h).unwrap();
        let keys = store.keys();
        let second = add(&store, &dir, &mut h).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.keys(), keys);
    }

    #[test]
    fn accumulators_are_independent() {
        let store = InMemoryKvStore::new();
        let mut h = Blake3Hasher::new();
        let mut one = DagAccumulator::new();
        let mut two = DagAccumulator::new();
        one.push_frame();
        one.add(&store, &file("a", b"1"), &mut h).unwrap();
        assert_eq!(one.depth(), 1);
        assert_eq!(two.depth(), 0);
        assert!(two.add(&store, &file("b", b"2"), &mut h).is_err());
    }
}
