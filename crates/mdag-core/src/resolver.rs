//! Read path: from a root hash and a name back to file bytes.
//!
//! Stored values carry no type tag, so the resolver classifies a root by
//! trying decodings in order: a [`DagObject`] is a tree, a strictly decodable
//! [`BlockLink`] whose block is present is the head of a list, and anything
//! else is a raw blob.
//!
//! Resolution takes a single name. `"a/b"` is compared literally against the
//! root's direct children and is therefore never found.

use std::collections::HashSet;

use mdag_store::KvStore;
use mdag_types::{BlockLink, ContentHash, DagObject, Link, LinkKind};
use tracing::{debug, trace};

use crate::error::{DagError, DagResult};

/// What a stored root turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedNode {
    /// A directory object (or an accumulator manifest).
    Tree(DagObject),
    /// A file stored as a raw block or a block chain.
    File { kind: LinkKind },
}

/// Resolves names and reassembles files from a store.
pub struct Resolver<'s> {
    store: &'s dyn KvStore,
}

impl<'s> Resolver<'s> {
    pub fn new(store: &'s dyn KvStore) -> Self {
        Self { store }
    }

    fn load(&self, hash: &ContentHash) -> DagResult<Vec<u8>> {
        self.store
            .get(hash)?
            .ok_or_else(|| DagError::ObjectNotFound(hash.clone()))
    }

    /// Load and classify the value stored under `hash`.
    pub fn decode(&self, hash: &ContentHash) -> DagResult<DecodedNode> {
        let bytes = self.load(hash)?;
        if let Ok(object) = DagObject::decode(&bytes) {
            return Ok(DecodedNode::Tree(object));
        }
        if let Ok(link) = BlockLink::from_bytes(&bytes) {
            if self.store.contains(&link.block_hash)? {
                return Ok(DecodedNode::File {
                    kind: LinkKind::List,
                });
            }
        }
        Ok(DecodedNode::File {
            kind: LinkKind::Blob,
        })
    }

    /// Return the content of the file called `name` under `root`.
    ///
    /// A directory root matches its first file link with that name;
    /// directory links never match. A file root has no recorded name other
    /// than the empty string.
    pub fn resolve(&self, root: &ContentHash, name: &str) -> DagResult<Vec<u8>> {
        let not_found = || DagError::NotFound {
            name: name.to_string(),
        };
        match self.decode(root)? {
            DecodedNode::Tree(object) => {
                let link = object
                    .links
                    .iter()
                    .find(|l| l.name == name && l.kind.is_file())
                    .ok_or_else(not_found)?;
                debug!(root = %root.short_hex(), name, hash = %link.hash.short_hex(), "resolved");
                let content = self.read_file(&link.hash, link.kind)?;
                if content.len() as u64 != link.size {
                    return Err(DagError::Decode {
                        hash: link.hash.clone(),
                        reason: format!(
                            "link declares {} bytes, reassembled {}",
                            link.size,
                            content.len()
                        ),
                    });
                }
                Ok(content)
            }
            DecodedNode::File { kind } if name.is_empty() => self.read_file(root, kind),
            DecodedNode::File { .. } => Err(not_found()),
        }
    }

    /// Reassemble a file from its root hash.
    pub fn read_file(&self, hash: &ContentHash, kind: LinkKind) -> DagResult<Vec<u8>> {
        match kind {
            LinkKind::Blob => self.load(hash),
            LinkKind::List => {
                let chain = self.walk_chain(hash)?;
                let mut content = Vec::new();
                for link in chain.iter().rev() {
                    content.extend_from_slice(&self.load(&link.block_hash)?);
                }
                Ok(content)
            }
            LinkKind::Tree => Err(DagError::Decode {
                hash: hash.clone(),
                reason: "a tree is not a file".into(),
            }),
        }
    }

    /// Follow `next` pointers from `head`; the result is head-first, so the
    /// file's first block comes last.
    pub fn walk_chain(&self, head: &ContentHash) -> DagResult<Vec<BlockLink>> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();
        let mut cursor = Some(head.clone());
        while let Some(hash) = cursor {
            if !seen.insert(hash.clone()) {
                return Err(DagError::Decode {
                    hash,
                    reason: "block chain contains a cycle".into(),
                });
            }
            let bytes = self.load(&hash)?;
            let link = BlockLink::from_bytes(&bytes).map_err(|e| DagError::Decode {
                hash: hash.clone(),
                reason: e.to_string(),
            })?;
            trace!(link = %hash.short_hex(), block = %link.block_hash.short_hex(), "chain step");
            cursor = link.next.clone();
            links.push(link);
        }
        Ok(links)
    }

    /// The links of a directory root.
    pub fn list(&self, root: &ContentHash) -> DagResult<Vec<Link>> {
        match self.decode(root)? {
            DecodedNode::Tree(object) => Ok(object.links),
            DecodedNode::File { kind } => Err(DagError::Decode {
                hash: root.clone(),
                reason: format!("expected a tree, found a {kind}"),
            }),
        }
    }
}
