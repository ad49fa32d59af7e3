//! Block links: the nodes of the linked list that threads a chunked file.
//!
//! The encoding is bit-exact because the encoded bytes are hashed to form the
//! block link's own identity:
//!
//! ```text
//! u64 BE len(block_hash) | block_hash | u64 BE len(next) | next
//! ```
//!
//! An absent `next` is written as a zero length with no bytes following.

use crate::error::{TypeError, TypeResult};
use crate::hash::ContentHash;

const LEN_PREFIX: usize = 8;

/// One node of a chunked file's block chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockLink {
    /// Hash of the raw block this node stands for.
    pub block_hash: ContentHash,
    /// Hash of the previously produced block link, absent for the first block.
    pub next: Option<ContentHash>,
}

impl BlockLink {
    /// Create a new block link.
    pub fn new(block_hash: ContentHash, next: Option<ContentHash>) -> Self {
        Self { block_hash, next }
    }

    /// Encoded length in bytes.
    pub fn encoded_len(&self) -> usize {
        2 * LEN_PREFIX + self.block_hash.len() + self.next.as_ref().map_or(0, |n| n.len())
    }

    /// Deterministic encoding. Injective over all block link values.
    pub fn to_bytes(&self) -> Vec<u8> {
        let next = self.next.as_ref().map_or(&[][..], |n| n.as_bytes());
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&(self.block_hash.len() as u64).to_be_bytes());
        buf.extend_from_slice(self.block_hash.as_bytes());
        buf.extend_from_slice(&(next.len() as u64).to_be_bytes());
        buf.extend_from_slice(next);
        buf
    }

    /// Strict decoder: rejects truncated input, trailing bytes and an empty
    /// block hash.
    pub fn from_bytes(bytes: &[u8]) -> TypeResult<Self> {
        let mut rest = bytes;
        let block_hash = take_field(&mut rest, "block hash")?;
        if block_hash.is_empty() {
            return Err(TypeError::MalformedBlockLink("empty block hash".into()));
        }
        let next = take_field(&mut rest, "next")?;
        if !rest.is_empty() {
            return Err(TypeError::MalformedBlockLink(format!(
                "{} trailing bytes",
                rest.len()
            )));
        }
        Ok(Self {
            block_hash: ContentHash::from_digest(block_hash),
            next: (!next.is_empty()).then(|| ContentHash::from_digest(next)),
        })
    }
}

fn take_field<'a>(rest: &mut &'a [u8], field: &str) -> TypeResult<&'a [u8]> {
    if rest.len() < LEN_PREFIX {
        return Err(TypeError::MalformedBlockLink(format!(
            "truncated {field} length"
        )));
    }
    let (prefix, tail) = rest.split_at(LEN_PREFIX);
    let mut len_bytes = [0u8; LEN_PREFIX];
    len_bytes.copy_from_slice(prefix);
    let len = u64::from_be_bytes(len_bytes);
    if len > tail.len() as u64 {
        return Err(TypeError::MalformedBlockLink(format!(
            "{field} length {len} exceeds {} remaining bytes",
            tail.len()
        )));
    }
    let (value, tail) = tail.split_at(len as usize);
    *rest = tail;
    Ok(value)
}
