//! # Key Algorithm Families
//!
//! The two supported signing algorithm families and their wire names.
//! Everything downstream (JWKS `alg`, JWS header `alg`, proof
//! `cryptosuite`) derives from this single enum.

use serde::{Deserialize, Serialize};

/// The algorithm family of a key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    /// RSA-2048 with SHA-256 (PKCS#1 v1.5). JWS `RS256`.
    Rsa256,
    /// Ed25519 (OKP). JWS `EdDSA`.
    Ed25519,
}

impl KeyAlgorithm {
    /// Parse an externally supplied algorithm name.
    ///
    /// Accepts the JWA name, the JWK `kty`, and the common family
    /// spellings. Returns `None` for unsupported algorithms — the caller
    /// maps that to a generation error.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RSA" | "RS256" | "rsa-sha256" | "RsaSha256" => Some(Self::Rsa256),
            "OKP" | "Ed25519" | "ed25519" | "EdDSA" => Some(Self::Ed25519),
            _ => None,
        }
    }

    /// The JWS/JWA algorithm identifier (`alg` header and JWK field).
    pub fn jws_alg(&self) -> &'static str {
        match self {
            Self::Rsa256 => "RS256",
            Self::Ed25519 => "EdDSA",
        }
    }

    /// The cryptosuite identifier carried by data-integrity proofs.
    pub fn cryptosuite(&self) -> &'static str {
        match self {
            Self::Rsa256 => "rsa-sha256",
            Self::Ed25519 => "eddsa-jcs-2022",
        }
    }

    /// The JWK key type (`kty`) for this family.
    pub fn kty(&self) -> &'static str {
        match self {
            Self::Rsa256 => "RSA",
            Self::Ed25519 => "OKP",
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.jws_alg())
    }
}
