use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;

/// Classification of a stored node, as returned by the chunker and the tree
/// builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// A file that fits in a single block, stored as raw bytes.
    Blob,
    /// A file spanning several blocks, stored as a chain of block links.
    List,
    /// A directory object.
    Tree,
}

impl LinkKind {
    /// The tag string (`"blob"`, `"list"` or `"tree"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::List => "list",
            Self::Tree => "tree",
        }
    }

    /// Returns `true` for the two file kinds.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::Blob | Self::List)
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named reference from a parent object to a child object.
///
/// `size` is the logical size of the child: a file's byte length or a
/// directory's aggregate size. It is never the size of the encoded record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Child name within its parent.
    pub name: String,
    /// Content hash of the child's root value.
    pub hash: ContentHash,
    /// Logical size of the child in bytes.
    pub size: u64,
    /// How the child is stored.
    pub kind: LinkKind,
}

impl Link {
    /// Create a new link.
    pub fn new(name: impl Into<String>, hash: ContentHash, size: u64, kind: LinkKind) -> Self {
        Self {
            name: name.into(),
            hash,
            size,
            kind,
        }
    }
}
