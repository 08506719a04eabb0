//! # Compact Token Construction
//!
//! Builds and parses the compact signed token carried by a
//! [`TokenProof`][crate::proof::TokenProof]:
//! `b64url(header).b64url(claims).b64url(signature)`.
//!
//! The signature covers the canonical form of the `header.claims`
//! signing string — the same [`CanonicalBytes`] pipeline every other
//! signature in the stack flows through, so a token cannot be produced
//! from non-canonical input.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use attest_core::CanonicalBytes;

/// The protected header of a compact token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// JWS algorithm: `RS256` or `EdDSA`.
    pub alg: String,
    /// The signing key id.
    pub kid: String,
    /// Token type, always `JWT`.
    pub typ: String,
}

/// Claims mirroring the payload's subject/issuer identity, making the
/// token self-contained for verification without the original payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The credential issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// The credential subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// The credential id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch, mirrored from the credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// A parsed compact token, retaining the exact signing input.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    /// The protected header.
    pub header: TokenHeader,
    /// The claims set.
    pub claims: TokenClaims,
    /// The `header.claims` string the signature covers.
    pub signing_input: String,
    /// The raw signature bytes.
    pub signature: Vec<u8>,
}

/// Serialize header and claims into the signing input string.
pub fn signing_input(header: &TokenHeader, claims: &TokenClaims) -> Result<String, serde_json::Error> {
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header)?);
    let claims_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
    Ok(format!("{header_b64}.{claims_b64}"))
}

/// Assemble the compact token from its signing input and signature.
pub fn assemble(signing_input: &str, signature: &[u8]) -> String {
    format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
}

/// The canonical bytes a token signature covers.
pub fn signed_bytes(signing_input: &str) -> Result<CanonicalBytes, attest_core::CanonicalizationError> {
    CanonicalBytes::new(&signing_input)
}

/// Split and decode a compact token. Returns `None` on any structural
/// defect — the engine maps that to `MALFORMED_PROOF`.
pub fn parse(jws: &str) -> Option<DecodedToken> {
    let mut parts = jws.split('.');
    let (header_b64, claims_b64, sig_b64) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let header: TokenHeader =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_b64).ok()?).ok()?;
    let claims: TokenClaims =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(claims_b64).ok()?).ok()?;
    let signature = URL_SAFE_NO_PAD.decode(sig_b64).ok()?;

    Some(DecodedToken {
        header,
        claims,
        signing_input: format!("{header_b64}.{claims_b64}"),
        signature,
    })
}
