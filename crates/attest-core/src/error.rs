//! # Core Error Types
//!
//! Structured error types shared across the attest stack, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.

use thiserror::Error;

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// The value serialized to something other than a JSON document
    /// (e.g. a bare float that cannot round-trip deterministically).
    #[error("value cannot be canonicalized: {0}")]
    Unrepresentable(String),
}
