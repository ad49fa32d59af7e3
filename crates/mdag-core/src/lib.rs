//! Content-addressed Merkle DAG over file trees.
//!
//! Files are split into fixed-size blocks and threaded into block chains;
//! directories become [`mdag_types::DagObject`]s linking their children by
//! name, hash, size and kind. Every stored value is keyed by the hash of its
//! own bytes, so identical content is stored once and a root hash commits to
//! the whole tree.
//!
//! - [`FileChunker`] stores a single file.
//! - [`TreeBuilder`] stores a directory recursively.
//! - [`DagAccumulator`] drives the stack-based `add` entry point.
//! - [`Resolver`] turns a root hash and a name back into bytes.

pub mod accumulator;
pub mod chunker;
pub mod config;
pub mod error;
pub mod fs;
pub mod mem;
pub mod node;
pub mod resolver;
pub mod tree;

#[cfg(test)]
mod testutil;

pub use accumulator::{add, DagAccumulator};
pub use chunker::{FileChunker, StoredNode, BLOCK_SIZE};
pub use config::DagConfig;
pub use error::{DagError, DagResult};
pub use fs::{open_node, FsDir, FsFile};
pub use mem::{MemDir, MemEntry, MemFile};
pub use node::{Children, DirNode, FileNode, Node, NodeKind};
pub use resolver::{DecodedNode, Resolver};
pub use tree::TreeBuilder;
