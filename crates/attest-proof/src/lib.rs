#![deny(missing_docs)]

//! # attest-proof — Proof Creation and Verification
//!
//! Produces and verifies the cryptographic evidence bound to issued
//! credentials, and answers the composite "is this credential valid
//! right now?" question.
//!
//! ## Contracts
//!
//! - **Tamper detection**: a proof signs the canonical form of the
//!   credential minus its `proof` member. Any mutation of a signed field
//!   after signing flips `has_valid_signature` to false.
//! - **Structured outcomes**: validity questions return
//!   [`VerificationOutcome`] rather than raising — callers branch on
//!   `error_code` without exception handling. Only infrastructure
//!   failures (key store I/O, probe transport) surface as [`ProofError`].
//! - **Decoupling**: the only component this engine calls is the key
//!   manager. Revocation lookups go through the [`RevocationProbe`]
//!   trait, adapted by the orchestration layer.

pub mod credential;
pub mod engine;
pub mod error;
pub mod proof;
pub mod token;

pub use credential::CredentialStatusRef;
pub use engine::{ProofEngine, RevocationProbe};
pub use error::ProofError;
pub use proof::{
    DataIntegrityProof, Proof, ProofErrorCode, ProofPurpose, TokenProof, VerificationOutcome,
};
pub use token::{TokenClaims, TokenHeader};
