use mdag_types::ContentHash;
use sha2::Digest;

/// A streaming hash primitive injected into the DAG builder.
///
/// Implementations must make [`reset`](HashPrimitive::reset) return the
/// primitive to its initial state. The builder reuses one instance for every
/// block, block link and object of a traversal and relies on
/// [`digest`](HashPrimitive::digest) starting from a clean state each time.
pub trait HashPrimitive {
    /// Return to the initial state, discarding any ingested bytes.
    fn reset(&mut self);

    /// Ingest more bytes.
    fn update(&mut self, data: &[u8]);

    /// Produce the digest of everything ingested since the last reset.
    fn finalize(&mut self) -> ContentHash;

    /// Digest length in bytes.
    fn output_len(&self) -> usize;

    /// Short algorithm name, used in logs.
    fn name(&self) -> &'static str;

    /// Hash one complete input: reset, ingest, finalize.
    fn digest(&mut self, data: &[u8]) -> ContentHash {
        self.reset();
        self.update(data);
        self.finalize()
    }
}

/// BLAKE3 (32-byte output).
#[derive(Clone, Default)]
pub struct Blake3Hasher {
    inner: blake3::Hasher,
}

impl Blake3Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashPrimitive for Blake3Hasher {
    fn reset(&mut self) {
        self.inner.reset();
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finalize(&mut self) -> ContentHash {
        ContentHash::from(*self.inner.finalize().as_bytes())
    }

    fn output_len(&self) -> usize {
        blake3::OUT_LEN
    }

    fn name(&self) -> &'static str {
        "blake3"
    }
}

impl std::fmt::Debug for Blake3Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Blake3Hasher")
    }
}

/// SHA-256 (32-byte output).
#[derive(Clone, Default)]
pub struct Sha256Hasher {
    inner: sha2::Sha256,
}

impl Sha256Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashPrimitive for Sha256Hasher {
    fn reset(&mut self) {
        Digest::reset(&mut self.inner);
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    fn finalize(&mut self) -> ContentHash {
        ContentHash::from_digest(self.inner.finalize_reset().to_vec())
    }

    fn output_len(&self) -> usize {
        <sha2::Sha256 as Digest>::output_size()
    }

    fn name(&self) -> &'static str {
        "sha256"
    }
}

impl std::fmt::Debug for Sha256Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Sha256Hasher")
    }
}
