//! # Key Pairs and Lifecycle Status
//!
//! [`KeyPair`] owns private signing material for one of the two supported
//! algorithm families. Signing input MUST be [`CanonicalBytes`] — you
//! cannot sign raw bytes, which enforces that all signed data has been
//! canonicalized through the JCS pipeline.
//!
//! ## Security Invariant
//!
//! `KeyPair` does not implement `Serialize` and its `Debug` impl redacts
//! the private material. The only outward representation of a key is the
//! public [`Jwk`][crate::jwks::Jwk] built from [`KeyPair::public_key`].

use attest_core::{CanonicalBytes, KeyId, Timestamp};
use rand_core::OsRng;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Serialize};

use crate::algorithm::KeyAlgorithm;
use crate::error::KeyError;

/// Lifecycle status of a key pair.
///
/// Transitions are monotonic: Active → Inactive → Revoked. The `Ord`
/// derivation respects declaration order, which is what makes the
/// monotonicity check a single comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// Usable for signing and verification; listed in the JWKS.
    Active,
    /// No longer signs or appears in the JWKS; still verifies.
    Inactive,
    /// Terminal. Verifies historical signatures only.
    Revoked,
}

impl KeyStatus {
    /// Whether a transition from `self` to `to` respects the monotonic
    /// lifecycle. Same-state transitions are permitted (idempotent).
    pub fn can_transition(self, to: KeyStatus) -> bool {
        to >= self
    }
}

/// Private signing material, by algorithm family.
enum KeyMaterial {
    Rsa(rsa::RsaPrivateKey),
    Ed25519(ed25519_dalek::SigningKey),
}

impl Clone for KeyMaterial {
    fn clone(&self) -> Self {
        match self {
            Self::Rsa(k) => Self::Rsa(k.clone()),
            Self::Ed25519(k) => Self::Ed25519(k.clone()),
        }
    }
}

/// The public half of a key pair, for signature verification.
#[derive(Clone)]
pub enum PublicKey {
    /// RSA public key (modulus + exponent).
    Rsa(rsa::RsaPublicKey),
    /// Ed25519 verifying key (32 bytes).
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl PublicKey {
    /// Verify a signature over canonical bytes.
    ///
    /// The message parameter is `&CanonicalBytes`, enforcing at compile
    /// time that only canonicalized data can be verified.
    pub fn verify(&self, data: &CanonicalBytes, signature: &[u8]) -> Result<(), KeyError> {
        match self {
            Self::Rsa(pk) => {
                let verifying = rsa::pkcs1v15::VerifyingKey::<sha2::Sha256>::new(pk.clone());
                let sig = rsa::pkcs1v15::Signature::try_from(signature)
                    .map_err(|e| KeyError::Verification(format!("malformed RSA signature: {e}")))?;
                verifying
                    .verify(data.as_bytes(), &sig)
                    .map_err(|e| KeyError::Verification(format!("RSA verification failed: {e}")))
            }
            Self::Ed25519(vk) => {
                use ed25519_dalek::Verifier as _;
                let sig = ed25519_dalek::Signature::from_slice(signature).map_err(|e| {
                    KeyError::Verification(format!("malformed Ed25519 signature: {e}"))
                })?;
                vk.verify(data.as_bytes(), &sig).map_err(|e| {
                    KeyError::Verification(format!("Ed25519 verification failed: {e}"))
                })
            }
        }
    }

    /// The RSA modulus as big-endian bytes, if this is an RSA key.
    pub fn rsa_modulus(&self) -> Option<Vec<u8>> {
        match self {
            Self::Rsa(pk) => Some(pk.n().to_bytes_be()),
            Self::Ed25519(_) => None,
        }
    }

    /// The RSA public exponent as big-endian bytes, if this is an RSA key.
    pub fn rsa_exponent(&self) -> Option<Vec<u8>> {
        match self {
            Self::Rsa(pk) => Some(pk.e().to_bytes_be()),
            Self::Ed25519(_) => None,
        }
    }

    /// The raw Ed25519 public key bytes, if this is an Ed25519 key.
    pub fn ed25519_bytes(&self) -> Option<[u8; 32]> {
        match self {
            Self::Rsa(_) => None,
            Self::Ed25519(vk) => Some(vk.to_bytes()),
        }
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa(_) => write!(f, "PublicKey::Rsa(2048)"),
            Self::Ed25519(_) => write!(f, "PublicKey::Ed25519"),
        }
    }
}

/// A key pair with its lifecycle state.
///
/// Does not implement `Serialize` — private keys must not be accidentally
/// serialized into logs, responses, or persisted documents.
#[derive(Clone)]
pub struct KeyPair {
    id: KeyId,
    algorithm: KeyAlgorithm,
    status: KeyStatus,
    created_at: Timestamp,
    material: KeyMaterial,
}

/// RSA modulus size for newly generated keys.
const RSA_BITS: usize = 2048;

impl KeyPair {
    /// Generate a fresh key pair.
    ///
    /// CPU-bound (notably for RSA) — callers on an async executor should
    /// run this under `spawn_blocking`, which [`KeyManager`][crate::manager::KeyManager]
    /// does.
    pub fn generate(
        id: KeyId,
        algorithm: KeyAlgorithm,
        created_at: Timestamp,
    ) -> Result<Self, KeyError> {
        let material = match algorithm {
            KeyAlgorithm::Rsa256 => {
                let private =
                    rsa::RsaPrivateKey::new(&mut OsRng, RSA_BITS).map_err(|e| {
                        KeyError::Generation {
                            id: id.to_string(),
                            reason: format!("RSA generation failed: {e}"),
                        }
                    })?;
                KeyMaterial::Rsa(private)
            }
            KeyAlgorithm::Ed25519 => {
                KeyMaterial::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng))
            }
        };
        Ok(Self {
            id,
            algorithm,
            status: KeyStatus::Active,
            created_at,
            material,
        })
    }

    /// The key identifier (JWK `kid`).
    pub fn id(&self) -> &KeyId {
        &self.id
    }

    /// The algorithm family.
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// The current lifecycle status.
    pub fn status(&self) -> KeyStatus {
        self.status
    }

    /// When the key was generated.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Replace the lifecycle status. The monotonicity check lives in
    /// [`KeyManager::set_key_status`][crate::manager::KeyManager::set_key_status];
    /// this is the raw mutation used after that check passes.
    pub fn with_status(mut self, status: KeyStatus) -> Self {
        self.status = status;
        self
    }

    /// Sign canonical bytes with this key's private material.
    ///
    /// RSA uses PKCS#1 v1.5 with SHA-256; Ed25519 signs per RFC 8032.
    /// The signing input MUST be `&CanonicalBytes` so that all signed
    /// data has passed through the canonicalization pipeline.
    pub fn sign(&self, data: &CanonicalBytes) -> Vec<u8> {
        match &self.material {
            KeyMaterial::Rsa(private) => {
                let signing = rsa::pkcs1v15::SigningKey::<sha2::Sha256>::new(private.clone());
                signing.sign(data.as_bytes()).to_vec()
            }
            KeyMaterial::Ed25519(signing) => {
                use ed25519_dalek::Signer as _;
                signing.sign(data.as_bytes()).to_bytes().to_vec()
            }
        }
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> PublicKey {
        match &self.material {
            KeyMaterial::Rsa(private) => PublicKey::Rsa(private.to_public_key()),
            KeyMaterial::Ed25519(signing) => PublicKey::Ed25519(signing.verifying_key()),
        }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("id", &self.id)
            .field("algorithm", &self.algorithm)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("material", &"<private>")
            .finish()
    }
}
