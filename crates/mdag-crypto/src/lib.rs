//! Hash primitives for mdag.
//!
//! The DAG builder never names a hash algorithm. It takes a
//! `&mut dyn HashPrimitive` and calls [`HashPrimitive::digest`], which resets
//! the primitive before every computation so reuse across many inputs never
//! carries state from one to the next.
//!
//! Every primitive wraps an established library.

pub mod algorithm;
pub mod primitive;

pub use algorithm::{AlgorithmError, HashAlgorithm};
pub use primitive::{Blake3Hasher, HashPrimitive, Sha256Hasher};
