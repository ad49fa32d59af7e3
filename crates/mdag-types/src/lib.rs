//! Foundation types for mdag.
//!
//! This crate provides the value types every other mdag crate shares. None of
//! them know how they were hashed or where they are stored; they only define
//! what gets hashed.
//!
//! # Key Types
//!
//! - [`ContentHash`] -- Opaque digest produced by an injected hash primitive
//! - [`Link`] -- Named, sized reference from a parent object to a child
//! - [`LinkKind`] -- Classification of a stored node (`blob`, `list`, `tree`)
//! - [`DagObject`] -- Persisted directory object: a links table plus data blobs
//! - [`BlockLink`] -- Node of the linked list threading a chunked file's blocks

pub mod block;
pub mod error;
pub mod hash;
pub mod link;
pub mod object;

pub use block::BlockLink;
pub use error::{TypeError, TypeResult};
pub use hash::ContentHash;
pub use link::{Link, LinkKind};
pub use object::DagObject;
