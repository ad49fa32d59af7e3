//! Content-addressed key/value storage for mdag.
//!
//! Every value the DAG builder produces is written under its own
//! [`ContentHash`]: raw blocks, encoded block links and encoded directory
//! objects alike.
//! The store is a plain key/value map: it never interprets values and never
//! checks that a value hashes to its key.
//!
//! # Storage Backends
//!
//! All backends implement the [`KvStore`] trait:
//!
//! - [`InMemoryKvStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsKvStore`] -- one file per key under a sharded directory tree
//!
//! # Design Rules
//!
//! 1. Values are immutable once written; a repeated `put` of an existing key
//!    is a no-op.
//! 2. A missing key reads as `Ok(None)`, never as an error.
//! 3. All I/O errors are propagated, never silently ignored.
//!
//! [`ContentHash`]: mdag_types::ContentHash

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use fs::FsKvStore;
pub use memory::InMemoryKvStore;
pub use traits::KvStore;
