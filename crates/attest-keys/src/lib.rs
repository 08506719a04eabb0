#![deny(missing_docs)]

//! # attest-keys — Key Lifecycle Management
//!
//! Owns issuer key pairs (RSA-2048 and Ed25519), exposes public key
//! material as a JWKS document, and resolves verification-method
//! references to concrete keys.
//!
//! ## Security Invariants
//!
//! - Private key material never leaves this crate: [`KeyPair`] does not
//!   implement `Serialize`, and its `Debug` impl redacts the material.
//! - [`KeyManager::get_public_key_set`] is built exclusively from public
//!   halves — RSA private parameters (`d`, `p`, `q`, `dp`, `dq`, `qi`)
//!   are unrepresentable in [`Jwk`].
//! - Key status transitions are monotonic: Active → Inactive → Revoked.
//!   A revoked key still verifies historical signatures but never signs.

pub mod algorithm;
pub mod error;
pub mod jwks;
pub mod keypair;
pub mod manager;
pub mod store;

pub use algorithm::KeyAlgorithm;
pub use error::KeyError;
pub use jwks::{Jwk, JwkParams, JwkSet};
pub use keypair::{KeyPair, KeyStatus, PublicKey};
pub use manager::{KeyManager, KeyManagerConfig, KeyUsage};
pub use store::{InMemoryKeyStore, KeyStore};
