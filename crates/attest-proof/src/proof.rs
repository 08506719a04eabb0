//! # Proof Types
//!
//! The tagged union over the two supported proof shapes, plus the
//! structured verification outcome.
//!
//! ## Exhaustive Matching
//!
//! [`Proof`] is a closed sum type — every consumer matches both
//! variants explicitly, so adding a third proof shape is a compile-time
//! event across the workspace.

use serde::{Deserialize, Serialize};

use attest_core::Timestamp;

/// Why a proof exists. Issued credentials use `assertionMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofPurpose {
    /// The proof asserts the credential's claims.
    #[serde(rename = "assertionMethod")]
    AssertionMethod,
    /// The proof authenticates the holder.
    #[serde(rename = "authentication")]
    Authentication,
}

/// A data-integrity proof: detached signature over the canonicalized
/// credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataIntegrityProof {
    /// Named digest+signature combination (e.g. `rsa-sha256`).
    pub cryptosuite: String,
    /// When the proof was produced.
    pub created: Timestamp,
    /// Key reference, optionally with a `#kid` fragment.
    pub verification_method: String,
    /// Why the proof exists.
    pub proof_purpose: ProofPurpose,
    /// The signature, base64url-no-pad.
    pub proof_value: String,
}

/// A compact signed-token proof, self-contained for verification
/// without the original payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenProof {
    /// The compact token: `b64(header).b64(claims).b64(signature)`.
    pub jws: String,
    /// When the proof was produced.
    pub created: Timestamp,
    /// Key reference, optionally with a `#kid` fragment.
    pub verification_method: String,
    /// Why the proof exists.
    pub proof_purpose: ProofPurpose,
}

/// Cryptographic evidence bound to a credential.
///
/// A credential owns zero, one, or many proofs; proofs have no identity
/// outside their owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Proof {
    /// Detached-signature proof.
    #[serde(rename = "DataIntegrityProof")]
    DataIntegrity(DataIntegrityProof),
    /// Compact signed-token proof.
    #[serde(rename = "TokenProof")]
    Token(TokenProof),
}

impl Proof {
    /// The key reference this proof was produced with.
    pub fn verification_method(&self) -> &str {
        match self {
            Self::DataIntegrity(p) => &p.verification_method,
            Self::Token(p) => &p.verification_method,
        }
    }
}

/// Why verification did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProofErrorCode {
    /// The signature does not match the (possibly mutated) payload.
    SignatureInvalid,
    /// The proof member is missing or structurally unusable.
    MalformedProof,
    /// The verification method named a key that cannot be resolved.
    KeyNotFound,
    /// The credential's expiry lies in the past.
    AssertionExpired,
    /// The credential has been revoked.
    AssertionRevoked,
}

/// The structured result of a validity question.
///
/// `has_valid_signature` reports the cryptographic check in isolation;
/// `is_valid` is the composite answer. A credential can carry a valid
/// signature and still be invalid (expired, revoked).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    /// The composite answer.
    pub is_valid: bool,
    /// Whether the signature check alone passed.
    pub has_valid_signature: bool,
    /// The first failure encountered, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ProofErrorCode>,
}

impl VerificationOutcome {
    /// A fully valid outcome.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            has_valid_signature: true,
            error_code: None,
        }
    }

    /// A failure where the signature itself did not hold.
    pub fn signature_failure(code: ProofErrorCode) -> Self {
        Self {
            is_valid: false,
            has_valid_signature: false,
            error_code: Some(code),
        }
    }

    /// A failure after the signature held (expiry, revocation).
    pub fn post_signature_failure(code: ProofErrorCode) -> Self {
        Self {
            is_valid: false,
            has_valid_signature: true,
            error_code: Some(code),
        }
    }
}
