use serde::{Deserialize, Serialize};

use crate::primitive::{Blake3Hasher, HashPrimitive, Sha256Hasher};

/// Selects which hash primitive a build uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

impl HashAlgorithm {
    /// Construct a fresh primitive for this algorithm.
    pub fn primitive(&self) -> Box<dyn HashPrimitive> {
        match self {
            Self::Blake3 => Box::new(Blake3Hasher::new()),
            Self::Sha256 => Box::new(Sha256Hasher::new()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(AlgorithmError::Unknown(other.to_string())),
        }
    }
}

/// Errors from selecting a hash algorithm.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AlgorithmError {
    #[error("unknown hash algorithm: {0}")]
    Unknown(String),
}
