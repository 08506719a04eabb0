//! # Content Digests
//!
//! Defines [`ContentDigest`] and the SHA-256 digest computation path.
//!
//! ## Security Invariant
//!
//! [`sha256_digest`] accepts only [`CanonicalBytes`] — not raw `&[u8]`.
//! Every digest in the system was therefore produced from properly
//! canonicalized data.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// The hash algorithm used to compute a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256 — the digest half of every supported cryptosuite.
    Sha256,
}

/// A content digest with its algorithm tag.
///
/// The 32-byte digest and its algorithm are stored together so that
/// verification code can select the correct hash function if further
/// algorithms are introduced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Return the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// The input must be [`CanonicalBytes`] — raw byte slices are not accepted.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    let out = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&out);
    ContentDigest {
        algorithm: DigestAlgorithm::Sha256,
        bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digest_is_deterministic() {
        let v = json!({"a": 1});
        let d1 = sha256_digest(&CanonicalBytes::new(&v).unwrap());
        let d2 = sha256_digest(&CanonicalBytes::new(&v).unwrap());
        assert_eq!(d1, d2);
    }

    #[test]
    fn digest_differs_on_mutation() {
        let d1 = sha256_digest(&CanonicalBytes::new(&json!({"id": "a"})).unwrap());
        let d2 = sha256_digest(&CanonicalBytes::new(&json!({"id": "b"})).unwrap());
        assert_ne!(d1, d2);
    }

    #[test]
    fn hex_is_64_chars() {
        let d = sha256_digest(&CanonicalBytes::new(&json!({})).unwrap());
        assert_eq!(d.to_hex().len(), 64);
    }

    #[test]
    fn display_carries_algorithm_tag() {
        let d = sha256_digest(&CanonicalBytes::new(&json!(null)).unwrap());
        assert!(d.to_string().starts_with("Sha256:"));
    }
}
