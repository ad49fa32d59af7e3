//! In-memory file trees.
//!
//! Useful for tests and for embedding callers that already hold the content.
//! Children are kept in insertion order, which is the order the builder sees.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::DagResult;
use crate::node::{Children, DirNode, FileNode, Node};

/// An in-memory file.
#[derive(Clone, Debug)]
pub struct MemFile {
    name: String,
    data: Arc<[u8]>,
    declared: Option<u64>,
}

impl MemFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: Arc::from(data.into()),
            declared: None,
        }
    }

    /// Override the declared size reported by [`FileNode::size`].
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared = Some(size);
        self
    }
}

impl FileNode for MemFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.declared.unwrap_or(self.data.len() as u64)
    }

    fn content(&self) -> DagResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.data))
    }
}

/// A child of a [`MemDir`].
#[derive(Clone, Debug)]
pub enum MemEntry {
    File(MemFile),
    Dir(MemDir),
}

impl MemEntry {
    fn size(&self) -> u64 {
        match self {
            Self::File(f) => f.size(),
            Self::Dir(d) => d.size(),
        }
    }

    fn to_node(&self) -> Node {
        match self {
            Self::File(f) => Node::file(f.clone()),
            Self::Dir(d) => Node::dir(d.clone()),
        }
    }
}

/// An in-memory directory. Cloning is cheap: entries are shared.
#[derive(Clone, Debug)]
pub struct MemDir {
    name: String,
    entries: Arc<Vec<MemEntry>>,
}

impl MemDir {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(Vec::new()),
        }
    }

    /// Append a file child.
    pub fn with_file(self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.with_entry(MemEntry::File(MemFile::new(name, data)))
    }

    /// Append a subdirectory.
    pub fn with_dir(self, dir: MemDir) -> Self {
        self.with_entry(MemEntry::Dir(dir))
    }

    /// Append any entry.
    pub fn with_entry(mut self, entry: MemEntry) -> Self {
        Arc::make_mut(&mut self.entries).push(entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DirNode for MemDir {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.entries.iter().map(MemEntry::size).sum()
    }

    fn children(&self) -> DagResult<Children<'_>> {
        Ok(Box::new(self.entries.iter().map(|e| Ok(e.to_node()))))
    }
}
