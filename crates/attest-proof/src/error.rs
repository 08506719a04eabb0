//! # Proof Engine Error Types
//!
//! Operational failures only. Validity determinations never land here —
//! they are carried by
//! [`VerificationOutcome`][crate::proof::VerificationOutcome].

use thiserror::Error;

use attest_core::CanonicalizationError;
use attest_keys::KeyError;

/// Operational failures during proof creation or verification.
#[derive(Error, Debug)]
pub enum ProofError {
    /// Key resolution or signing-key access failed.
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// The payload could not be canonicalized for signing.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The signing task was cancelled or panicked.
    #[error("signing task failed: {0}")]
    SigningTask(String),

    /// The revocation probe collaborator failed.
    #[error("revocation probe error: {0}")]
    Probe(String),
}
