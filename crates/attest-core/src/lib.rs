#![deny(missing_docs)]

//! # attest-core — Foundational Types for the Attest Stack
//!
//! This crate defines the foundational types that every other crate in the
//! workspace depends on. It has no internal crate dependencies — only `serde`,
//! `serde_json`, `thiserror`, `chrono`, `uuid`, and `sha2` from the external
//! ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass an [`IssuerId`] where a [`KeyId`] is
//!    expected.
//!
//! 2. **[`CanonicalBytes`] is the sole path to signing input.** All digest
//!    and signature computation in the stack flows through
//!    `CanonicalBytes::new()`, which applies JCS-compatible canonicalization
//!    (sorted keys, compact separators, datetime normalization).
//!
//! 3. **The clock is a collaborator.** Nothing in the stack calls
//!    `Utc::now()` directly — time comes from an injected [`Clock`] so that
//!    expiry and issuance-date logic is testable with a [`FixedClock`].

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::CanonicalizationError;
pub use identity::{CredentialId, IssuerId, KeyId, StatusListId};
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp};
