//! # Key Management Error Types
//!
//! Structured errors for key generation, lookup, and lifecycle
//! transitions. Uses `thiserror` for ergonomic definitions with
//! diagnostic context.

use thiserror::Error;

use crate::keypair::KeyStatus;

/// Errors from key management operations.
#[derive(Error, Debug)]
pub enum KeyError {
    /// An explicitly requested key does not exist or is not usable for
    /// the requested operation.
    #[error("key not found: \"{0}\"")]
    NotFound(String),

    /// Key generation failed: unsupported algorithm, identifier
    /// collision, or an RNG/arithmetic failure in the underlying crypto.
    #[error("key generation failed for \"{id}\": {reason}")]
    Generation {
        /// The requested key identifier.
        id: String,
        /// Why generation was rejected or failed.
        reason: String,
    },

    /// An attempted status transition violates the monotonic
    /// Active → Inactive → Revoked lifecycle.
    #[error("invalid status transition for key \"{id}\": {from:?} -> {to:?}")]
    InvalidTransition {
        /// The key whose transition was rejected.
        id: String,
        /// The key's current status.
        from: KeyStatus,
        /// The rejected target status.
        to: KeyStatus,
    },

    /// Signature verification failed at the crypto layer.
    #[error("signature verification failed: {0}")]
    Verification(String),

    /// The persistence collaborator failed.
    #[error("key store error: {0}")]
    Store(String),
}
