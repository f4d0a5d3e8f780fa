//! Integrity hashing for deltas.
//!
//! This module defines `IntegrityHash`, a SHA-256 value used to verify that
//! a delta's operations and metadata were not altered after generation.
//! SHA-256 is used unconditionally so integrity checks stay comparable
//! wherever a delta travels.
//!
//! The hash input is the base64 envelope of the delta with the hash field
//! itself removed, along with the generation-time instrumentation so the
//! digest stays identical across repeated runs; verification rebuilds the
//! same bytes and compares.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{delta::TextDelta, delta::wire, errors::DeltaError};

/// A SHA-256 hash used for integrity verification.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntegrityHash([u8; 32]);

impl IntegrityHash {
    /// Create a new hash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Compute the hash of content bytes.
    pub fn compute(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hasher.finalize().into())
    }

    /// Return the lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for IntegrityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntegrityHash({})", self.to_hex())
    }
}

impl fmt::Display for IntegrityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for IntegrityHash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(format!("Invalid hash length: expected 64, got {}", s.len()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| e.to_string())?;
        Ok(Self(bytes))
    }
}

impl Serialize for IntegrityHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for IntegrityHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute a delta's integrity hash over its canonical encoding with the
/// hash field excluded.
///
/// The timing field is excluded as well: it is instrumentation, and the
/// digest must be identical for repeated generations over the same inputs.
pub fn compute_delta_hash(delta: &TextDelta) -> Result<IntegrityHash, DeltaError> {
    let mut stripped = delta.clone();
    if let Some(meta) = stripped.metadata.as_mut() {
        meta.diff_hash = None;
        meta.generation_time_ms = None;
    }
    let envelope = wire::encode_base64(&stripped)?;
    Ok(IntegrityHash::compute(envelope.as_bytes()))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{IntegrityHash, compute_delta_hash};
    use crate::{delta::TextDelta, internal::op::DiffOp};

    /// Hashing "Hello, world!" should match the known SHA-256 value.
    #[test]
    fn known_sha256_value() {
        let hash = IntegrityHash::compute("Hello, world!".as_bytes());
        assert_eq!(
            hash.to_hex(),
            "315f5bdb76d078c43b8ac0064e4a0164612b1fce77c869345bfc94c75894edd3"
        );
    }

    /// Hex parsing round-trips and rejects bad lengths.
    #[test]
    fn hex_round_trip() {
        let hex = "315f5bdb76d078c43b8ac0064e4a0164612b1fce77c869345bfc94c75894edd3";
        let hash = IntegrityHash::from_str(hex).unwrap();
        assert_eq!(hash.to_string(), hex);
        assert!(IntegrityHash::from_str("deadbeef").is_err());
    }

    /// The delta hash ignores a stored hash field, so recomputation is
    /// stable.
    #[test]
    fn delta_hash_excludes_hash_field() {
        let delta = crate::delta::create_diff("a\nb\n", "a\nc\n");
        let meta = delta.metadata.as_ref().unwrap();
        let stored = meta.diff_hash.clone().unwrap();
        let recomputed = compute_delta_hash(&delta).unwrap();
        assert_eq!(recomputed.to_hex(), stored);
    }

    /// The timing field does not influence the digest.
    #[test]
    fn delta_hash_ignores_timing() {
        let mut delta = crate::delta::create_diff("a\nb\n", "a\nc\n");
        let baseline = compute_delta_hash(&delta).unwrap();
        if let Some(meta) = delta.metadata.as_mut() {
            meta.generation_time_ms = Some(12_345);
        }
        assert_eq!(compute_delta_hash(&delta).unwrap(), baseline);
    }

    /// Different operation sequences hash differently.
    #[test]
    fn distinct_deltas_hash_differently() {
        let a = TextDelta::from_ops(vec![DiffOp::Retain(1)]);
        let b = TextDelta::from_ops(vec![DiffOp::Retain(2)]);
        assert_ne!(
            compute_delta_hash(&a).unwrap(),
            compute_delta_hash(&b).unwrap()
        );
    }
}
