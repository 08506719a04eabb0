//! # JWKS — Public Key Set Document
//!
//! The JWKS-shaped document verifiers use to resolve signing keys by id.
//!
//! ## Security Invariant
//!
//! [`Jwk`] is constructed exclusively from [`PublicKey`] halves. RSA
//! private parameters (`d`, `p`, `q`, `dp`, `dq`, `qi`) have no field to
//! land in — leaking them is unrepresentable, not merely forbidden.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::algorithm::KeyAlgorithm;
use crate::keypair::{KeyPair, PublicKey};

/// Algorithm-specific public parameters of a JWK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JwkParams {
    /// RSA public parameters: modulus and exponent, base64url-no-pad.
    Rsa {
        /// Modulus, big-endian, base64url.
        n: String,
        /// Public exponent, big-endian, base64url.
        e: String,
    },
    /// Octet key pair (Ed25519) public parameters.
    Okp {
        /// Curve name — always `Ed25519` here.
        crv: String,
        /// Public key bytes, base64url.
        x: String,
    },
}

/// A single public key entry in the JWKS document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type: `RSA` or `OKP`.
    pub kty: String,
    /// Intended use — always `sig`.
    #[serde(rename = "use")]
    pub use_: String,
    /// Permitted operations — always `["verify"]`.
    pub key_ops: Vec<String>,
    /// Key identifier, matching the verification-method fragment.
    pub kid: String,
    /// JWS algorithm: `RS256` or `EdDSA`.
    pub alg: String,
    /// Algorithm-specific public fields.
    #[serde(flatten)]
    pub params: JwkParams,
}

impl Jwk {
    /// Build the public JWK for a key pair.
    pub fn from_key_pair(key: &KeyPair) -> Self {
        let params = match key.public_key() {
            PublicKey::Rsa(_) => {
                let public = key.public_key();
                // Both accessors are Some for the Rsa variant.
                let n = public.rsa_modulus().unwrap_or_default();
                let e = public.rsa_exponent().unwrap_or_default();
                JwkParams::Rsa {
                    n: URL_SAFE_NO_PAD.encode(n),
                    e: URL_SAFE_NO_PAD.encode(e),
                }
            }
            PublicKey::Ed25519(vk) => JwkParams::Okp {
                crv: "Ed25519".to_string(),
                x: URL_SAFE_NO_PAD.encode(vk.to_bytes()),
            },
        };
        Self {
            kty: key.algorithm().kty().to_string(),
            use_: "sig".to_string(),
            key_ops: vec!["verify".to_string()],
            kid: key.id().to_string(),
            alg: key.algorithm().jws_alg().to_string(),
            params,
        }
    }

    /// Reconstruct the verifying key from the public parameters.
    ///
    /// Used by verifiers that received this document over the wire.
    pub fn to_public_key(&self) -> Option<PublicKey> {
        match &self.params {
            JwkParams::Rsa { n, e } => {
                let n = rsa::BigUint::from_bytes_be(&URL_SAFE_NO_PAD.decode(n).ok()?);
                let e = rsa::BigUint::from_bytes_be(&URL_SAFE_NO_PAD.decode(e).ok()?);
                rsa::RsaPublicKey::new(n, e).ok().map(PublicKey::Rsa)
            }
            JwkParams::Okp { x, .. } => {
                let bytes: [u8; 32] = URL_SAFE_NO_PAD.decode(x).ok()?.try_into().ok()?;
                ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                    .ok()
                    .map(PublicKey::Ed25519)
            }
        }
    }

    /// The algorithm family this entry belongs to.
    pub fn algorithm(&self) -> Option<KeyAlgorithm> {
        KeyAlgorithm::parse(&self.alg)
    }
}

/// A JWKS document: the set of active public keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    /// The public key entries.
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find an entry by key id.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }
}
