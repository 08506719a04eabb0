//! # Proof Engine
//!
//! Creates and verifies proofs, and answers the composite credential
//! validity question. The engine's only component dependency is the key
//! manager; revocation lookups go through the injected
//! [`RevocationProbe`].

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;

use attest_core::{sha256_digest, CanonicalBytes, Clock, KeyId};
use attest_keys::{KeyError, KeyManager, KeyPair, KeyUsage};

use crate::credential::{self, CredentialStatusRef};
use crate::error::ProofError;
use crate::proof::{
    DataIntegrityProof, Proof, ProofErrorCode, ProofPurpose, TokenProof, VerificationOutcome,
};
use crate::token::{self, TokenClaims, TokenHeader};

/// Answers "is this credential's status-list entry flipped?".
///
/// Implemented by the orchestration layer against the status-list
/// manager; the engine itself never calls another component.
#[async_trait]
pub trait RevocationProbe: Send + Sync {
    /// Whether the referenced status entry holds a non-zero value.
    async fn is_revoked(&self, status: &CredentialStatusRef) -> Result<bool, ProofError>;
}

/// Creates and verifies proofs over credential documents.
pub struct ProofEngine {
    keys: Arc<KeyManager>,
    clock: Arc<dyn Clock>,
}

impl ProofEngine {
    /// Create an engine over the given key manager and clock.
    pub fn new(keys: Arc<KeyManager>, clock: Arc<dyn Clock>) -> Self {
        Self { keys, clock }
    }

    /// Attach a proof to a credential document.
    ///
    /// A first proof becomes the `proof` member directly; further proofs
    /// grow it into an array. Existing proofs are never displaced.
    pub fn attach(credential: &Value, proof: Proof) -> Value {
        let mut out = credential.clone();
        let proof_value = serde_json::to_value(&proof).unwrap_or(Value::Null);
        if let Some(obj) = out.as_object_mut() {
            match obj.remove(credential::PROOF_MEMBER) {
                None => {
                    obj.insert(credential::PROOF_MEMBER.to_string(), proof_value);
                }
                Some(Value::Array(mut existing)) => {
                    existing.push(proof_value);
                    obj.insert(credential::PROOF_MEMBER.to_string(), Value::Array(existing));
                }
                Some(single) => {
                    obj.insert(
                        credential::PROOF_MEMBER.to_string(),
                        Value::Array(vec![single, proof_value]),
                    );
                }
            }
        }
        out
    }

    /// Create a data-integrity proof over `payload`.
    ///
    /// Canonicalizes the payload (minus any existing `proof` member),
    /// signs with the resolved key, and returns the detached proof.
    /// Signing runs under `spawn_blocking` — RSA signatures must not
    /// stall concurrent verification tasks.
    pub async fn create_data_integrity_proof(
        &self,
        payload: &Value,
        key_id: Option<&KeyId>,
    ) -> Result<DataIntegrityProof, ProofError> {
        let key = self.resolve_signing_key(key_id).await?;
        let bytes = CanonicalBytes::new(&credential::without_proof(payload))?;
        tracing::debug!(
            key_id = %key.id(),
            payload_digest = %sha256_digest(&bytes),
            "signing data-integrity proof"
        );
        let signature = sign_blocking(key.clone(), bytes).await?;

        Ok(DataIntegrityProof {
            cryptosuite: key.algorithm().cryptosuite().to_string(),
            created: self.clock.now(),
            verification_method: self.keys.verification_method(key.id()),
            proof_purpose: ProofPurpose::AssertionMethod,
            proof_value: URL_SAFE_NO_PAD.encode(signature),
        })
    }

    /// Create a compact token proof whose claims mirror the payload's
    /// subject/issuer identity, self-contained for verification without
    /// the original payload.
    pub async fn create_token_proof(
        &self,
        payload: &Value,
        key_id: Option<&KeyId>,
    ) -> Result<TokenProof, ProofError> {
        let key = self.resolve_signing_key(key_id).await?;
        let now = self.clock.now();

        let header = TokenHeader {
            alg: key.algorithm().jws_alg().to_string(),
            kid: key.id().to_string(),
            typ: "JWT".to_string(),
        };
        let claims = TokenClaims {
            iss: credential::issuer_id(payload),
            sub: credential::subject_id(payload),
            jti: credential::credential_id(payload),
            iat: now.unix_secs(),
            exp: credential::expiry(payload).map(|t| t.unix_secs()),
        };

        let signing_input = token::signing_input(&header, &claims)
            .map_err(attest_core::CanonicalizationError::from)?;
        let bytes = token::signed_bytes(&signing_input)?;
        let signature = sign_blocking(key.clone(), bytes).await?;

        Ok(TokenProof {
            jws: token::assemble(&signing_input, &signature),
            created: now,
            verification_method: self.keys.verification_method(key.id()),
            proof_purpose: ProofPurpose::AssertionMethod,
        })
    }

    /// Verify every proof attached to `payload`.
    ///
    /// Returns a structured outcome — validity questions never raise.
    /// The outcome is valid only when at least one proof is attached and
    /// all attached proofs verify. `Err` is reserved for infrastructure
    /// failures (key store I/O), never for validity determinations.
    pub async fn verify_proof(&self, payload: &Value) -> Result<VerificationOutcome, ProofError> {
        let proofs = match credential::proofs(payload) {
            Some(proofs) => proofs,
            None => {
                return Ok(VerificationOutcome::signature_failure(
                    ProofErrorCode::MalformedProof,
                ))
            }
        };

        for proof in &proofs {
            let outcome = self.verify_single(payload, proof).await?;
            if !outcome.is_valid {
                return Ok(outcome);
            }
        }
        Ok(VerificationOutcome::valid())
    }

    /// Verify one proof against the payload it is attached to.
    ///
    /// Callers filtering a multi-proof credential by proof type use this
    /// directly; [`verify_proof`][Self::verify_proof] folds it over every
    /// attached proof.
    pub async fn verify_single(
        &self,
        payload: &Value,
        proof: &Proof,
    ) -> Result<VerificationOutcome, ProofError> {
        let key = match self
            .keys
            .resolve_key(Some(proof.verification_method()), KeyUsage::Verification)
            .await
        {
            Ok(key) => key,
            Err(KeyError::NotFound(_)) => {
                return Ok(VerificationOutcome::signature_failure(
                    ProofErrorCode::KeyNotFound,
                ))
            }
            Err(other) => return Err(ProofError::Key(other)),
        };

        match proof {
            Proof::DataIntegrity(p) => self.verify_data_integrity(payload, p, &key),
            Proof::Token(p) => self.verify_token(payload, p, &key),
        }
    }

    fn verify_data_integrity(
        &self,
        payload: &Value,
        proof: &DataIntegrityProof,
        key: &KeyPair,
    ) -> Result<VerificationOutcome, ProofError> {
        let signature = match URL_SAFE_NO_PAD.decode(&proof.proof_value) {
            Ok(sig) => sig,
            Err(_) => {
                return Ok(VerificationOutcome::signature_failure(
                    ProofErrorCode::MalformedProof,
                ))
            }
        };

        let bytes = CanonicalBytes::new(&credential::without_proof(payload))?;
        match key.public_key().verify(&bytes, &signature) {
            Ok(()) => Ok(VerificationOutcome::valid()),
            Err(_) => Ok(VerificationOutcome::signature_failure(
                ProofErrorCode::SignatureInvalid,
            )),
        }
    }

    fn verify_token(
        &self,
        payload: &Value,
        proof: &TokenProof,
        key: &KeyPair,
    ) -> Result<VerificationOutcome, ProofError> {
        let decoded = match token::parse(&proof.jws) {
            Some(decoded) => decoded,
            None => {
                return Ok(VerificationOutcome::signature_failure(
                    ProofErrorCode::MalformedProof,
                ))
            }
        };

        if decoded.header.alg != key.algorithm().jws_alg() {
            return Ok(VerificationOutcome::signature_failure(
                ProofErrorCode::SignatureInvalid,
            ));
        }

        let bytes = token::signed_bytes(&decoded.signing_input)?;
        if key.public_key().verify(&bytes, &decoded.signature).is_err() {
            return Ok(VerificationOutcome::signature_failure(
                ProofErrorCode::SignatureInvalid,
            ));
        }

        // Tamper contract: the signed claims must still mirror the
        // payload's identity fields.
        let mirrored = [
            (decoded.claims.iss.as_deref(), credential::issuer_id(payload)),
            (decoded.claims.sub.as_deref(), credential::subject_id(payload)),
            (decoded.claims.jti.as_deref(), credential::credential_id(payload)),
        ];
        for (claimed, current) in mirrored {
            if let (Some(claimed), Some(current)) = (claimed, current) {
                if claimed != current {
                    return Ok(VerificationOutcome::signature_failure(
                        ProofErrorCode::SignatureInvalid,
                    ));
                }
            }
        }

        Ok(VerificationOutcome::valid())
    }

    /// Composite validity check, in strict order: signature, then
    /// expiry, then revocation — short-circuiting on the first failure.
    ///
    /// Revocation consults the credential's local `revoked` flag first,
    /// then each `credentialStatus` pointer via `probe` when one is
    /// supplied. Pure query: no side effects, safely retryable.
    pub async fn verify_credential_validity(
        &self,
        credential: &Value,
        probe: Option<&dyn RevocationProbe>,
    ) -> Result<VerificationOutcome, ProofError> {
        let signature = self.verify_proof(credential).await?;
        if !signature.is_valid {
            return Ok(signature);
        }

        if let Some(expiry) = credential::expiry(credential) {
            if expiry < self.clock.now() {
                return Ok(VerificationOutcome::post_signature_failure(
                    ProofErrorCode::AssertionExpired,
                ));
            }
        }

        if credential::locally_revoked(credential) {
            return Ok(VerificationOutcome::post_signature_failure(
                ProofErrorCode::AssertionRevoked,
            ));
        }
        if let Some(probe) = probe {
            for status in credential::status_refs(credential) {
                if probe.is_revoked(&status).await? {
                    return Ok(VerificationOutcome::post_signature_failure(
                        ProofErrorCode::AssertionRevoked,
                    ));
                }
            }
        }

        Ok(VerificationOutcome::valid())
    }

    async fn resolve_signing_key(&self, key_id: Option<&KeyId>) -> Result<KeyPair, ProofError> {
        let reference = key_id.map(|id| self.keys.verification_method(id));
        Ok(self
            .keys
            .resolve_key(reference.as_deref(), KeyUsage::Signing)
            .await?)
    }
}

/// Run a signature off the async executor.
async fn sign_blocking(key: KeyPair, bytes: CanonicalBytes) -> Result<Vec<u8>, ProofError> {
    tokio::task::spawn_blocking(move || key.sign(&bytes))
        .await
        .map_err(|e| ProofError::SigningTask(e.to_string()))
}
