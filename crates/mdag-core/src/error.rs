//! Error types for DAG construction and retrieval.

use mdag_types::ContentHash;

/// Errors that can occur while building or reading the DAG.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// A store read or write failed.
    #[error("store error: {0}")]
    Store(#[from] mdag_store::StoreError),

    /// Encoding or decoding a persisted value failed.
    #[error("encoding error: {0}")]
    Type(#[from] mdag_types::TypeError),

    /// Reading a node from the file system failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No file with the requested name exists under the root.
    #[error("file not found: {name:?}")]
    NotFound {
        /// The requested path segment.
        name: String,
    },

    /// A hash referenced during retrieval is not in the store.
    #[error("object not found: {0}")]
    ObjectNotFound(ContentHash),

    /// Persisted bytes do not decode as the expected kind of value.
    #[error("cannot decode {hash}: {reason}")]
    Decode {
        /// Hash of the offending value.
        hash: ContentHash,
        /// What went wrong.
        reason: String,
    },

    /// A file was added while no accumulator frame was open.
    #[error("cannot add a file with no open accumulator frame")]
    EmptyStack,

    /// A file's content length disagrees with its declared size.
    #[error("size mismatch for {name:?}: declared {declared} bytes, read {actual}")]
    SizeMismatch {
        /// File name.
        name: String,
        /// Size reported by the node.
        declared: u64,
        /// Length of the content actually read.
        actual: u64,
    },

    /// The build configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DagError {
    /// Returns `true` for the two not-found conditions of the read path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ObjectNotFound(_))
    }
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
