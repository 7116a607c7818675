//! Digests: fixed-length blake3 fingerprints of canonical data
//!
//! A [`Digest`] is the hex form of a 32-byte blake3 hash. [`DigestBuilder`]
//! feeds named fields into the hasher with length framing, so that
//! `("ab", ["c"])` and `("a", ["bc"])` can never collide. Callers are
//! responsible for presenting fields in a stable order; the builder hashes
//! exactly what it is given.
use crate::error::DeckhandError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Length of the hex representation.
    pub const LEN: usize = 64;

    pub fn of_bytes(data: &[u8]) -> Self {
        Self(blake3::hash(data).to_hex().to_string())
    }

    /// Accept a previously persisted digest.
    pub fn parse(hex: &str) -> Result<Self, DeckhandError> {
        if hex.len() != Self::LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DeckhandError::contract(format!(
                "digest must be {} hex characters, got {:?}",
                Self::LEN,
                hex
            )));
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix suitable for log lines.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct DigestBuilder {
    hasher: blake3::Hasher,
}

impl DigestBuilder {
    /// Start a digest in the given domain (e.g. `"deckhand.filter.v1"`).
    pub fn new(domain: &str) -> Self {
        let mut builder = Self {
            hasher: blake3::Hasher::new(),
        };
        builder.frame(domain.as_bytes());
        builder
    }

    /// Add one named field and its values.
    pub fn field<S: AsRef<str>>(&mut self, name: &str, values: &[S]) -> &mut Self {
        self.frame(name.as_bytes());
        self.hasher.update(&(values.len() as u64).to_le_bytes());
        for value in values {
            self.frame(value.as_ref().as_bytes());
        }
        self
    }

    pub fn finish(&self) -> Digest {
        Digest(self.hasher.finalize().to_hex().to_string())
    }

    fn frame(&mut self, bytes: &[u8]) {
        self.hasher.update(&(bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }
}
