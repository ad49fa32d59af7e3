use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::link::Link;

/// A persisted directory object (or an accumulator frame under construction).
///
/// `links[i]` and `data[i]` do not have to correspond positionally. Objects
/// written by the tree builder leave `data` empty; accumulator frames record
/// the head reference of each entry they append.
///
/// The encoding is JSON with a fixed field order (`links`, then `data`) and
/// list order preserved, so the same logical value always encodes to the same
/// bytes and therefore to the same hash.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DagObject {
    /// Child references in insertion order.
    pub links: Vec<Link>,
    /// Payload blobs accumulated alongside the links.
    #[serde(with = "hex_blobs")]
    pub data: Vec<Vec<u8>>,
}

impl DagObject {
    /// Create an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object holding only links.
    pub fn with_links(links: Vec<Link>) -> Self {
        Self {
            links,
            data: Vec::new(),
        }
    }

    /// Append a link and its data entry.
    pub fn push(&mut self, link: Link, data: Vec<u8>) {
        self.links.push(link);
        self.data.push(data);
    }

    /// First link with the given name.
    pub fn get(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if the object has no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Sum of the logical sizes of all links.
    pub fn total_size(&self) -> u64 {
        self.links.iter().map(|l| l.size).sum()
    }

    /// Canonical encoding used both as the hash input and the stored value.
    pub fn encode(&self) -> TypeResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Decode a stored object.
    pub fn decode(bytes: &[u8]) -> TypeResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

/// Serializes `Vec<Vec<u8>>` as a list of hex strings.
mod hex_blobs {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(blobs: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(blobs.iter().map(hex::encode))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .iter()
            .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
            .collect()
    }
}
