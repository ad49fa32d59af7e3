//! The file/directory abstraction the builder walks.
//!
//! A [`Node`] is either a file or a directory. Files expose their name,
//! declared size and content; directories expose their name, aggregate size
//! and a restartable listing of children. Where the nodes come from (memory,
//! the local file system, an archive) is up to the implementor; see
//! [`crate::mem`] and [`crate::fs`] for the two shipped sources.

use std::borrow::Cow;
use std::fmt;

use crate::error::DagResult;

/// Iterator over a directory's children.
pub type Children<'a> = Box<dyn Iterator<Item = DagResult<Node>> + 'a>;

/// A file the builder can chunk.
pub trait FileNode {
    /// Name within the parent directory.
    fn name(&self) -> &str;

    /// Declared size in bytes.
    fn size(&self) -> u64;

    /// Full content. Its length must equal [`size`](FileNode::size).
    fn content(&self) -> DagResult<Cow<'_, [u8]>>;
}

/// A directory the builder can descend into.
pub trait DirNode {
    /// Name within the parent directory.
    fn name(&self) -> &str;

    /// Aggregate size of everything below this directory.
    fn size(&self) -> u64;

    /// A fresh listing of the children.
    ///
    /// Every call starts from the beginning and must yield the children in
    /// the same order, otherwise the directory's hash is not reproducible.
    fn children(&self) -> DagResult<Children<'_>>;
}

/// Which capability a node has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

/// A file or a directory.
pub enum Node {
    File(Box<dyn FileNode>),
    Dir(Box<dyn DirNode>),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Self::File(f) => f.name(),
            Self::Dir(d) => d.name(),
        }
    }

    /// Declared file size or aggregate directory size.
    pub fn size(&self) -> u64 {
        match self {
            Self::File(f) => f.size(),
            Self::Dir(d) => d.size(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File(_) => NodeKind::File,
            Self::Dir(_) => NodeKind::Dir,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind() == NodeKind::File
    }

    pub fn file(file: impl FileNode + 'static) -> Self {
        Self::File(Box::new(file))
    }

    pub fn dir(dir: impl DirNode + 'static) -> Self {
        Self::Dir(Box::new(dir))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("size", &self.size())
            .finish()
    }
}
