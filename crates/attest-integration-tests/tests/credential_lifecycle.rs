//! End-to-end credential lifecycle: issue with a status-list slot, sign,
//! verify, revoke, and re-verify — wiring the proof engine's revocation
//! probe to the status-list manager the way the orchestration layer does.

use std::sync::Arc;

use async_trait::async_trait;
use attest_core::{CredentialId, FixedClock, IssuerId, KeyId, StatusListId, Timestamp};
use attest_keys::{InMemoryKeyStore, KeyManager, KeyManagerConfig};
use attest_proof::{
    CredentialStatusRef, Proof, ProofEngine, ProofError, ProofErrorCode, RevocationProbe,
};
use attest_status::{
    InMemoryStatusStore, StatusListConfig, StatusListManager, StatusPurpose, StatusSize,
};
use serde_json::{json, Value};
use url::Url;

const NOW: &str = "2026-01-15T12:00:00Z";
const ISSUER: &str = "https://issuer.example.org";

/// Adapts the status-list manager to the engine's revocation probe, the
/// way the orchestration layer wires the two components together.
struct StatusListProbe {
    status: Arc<StatusListManager>,
}

#[async_trait]
impl RevocationProbe for StatusListProbe {
    async fn is_revoked(&self, status: &CredentialStatusRef) -> Result<bool, ProofError> {
        let list_id = status
            .status_list_credential
            .rsplit('/')
            .next()
            .and_then(|segment| uuid::Uuid::parse_str(segment).ok())
            .map(StatusListId::from_uuid)
            .ok_or_else(|| ProofError::Probe("unresolvable status list credential".to_string()))?;
        let index = status
            .index()
            .ok_or_else(|| ProofError::Probe("non-numeric status list index".to_string()))?;
        let value = self
            .status
            .get_status(&list_id, index)
            .await
            .map_err(|e| ProofError::Probe(e.to_string()))?;
        Ok(value != 0)
    }
}

struct Harness {
    keys: Arc<KeyManager>,
    engine: ProofEngine,
    status: Arc<StatusListManager>,
}

async fn harness() -> Harness {
    let clock = Arc::new(FixedClock(Timestamp::parse(NOW).unwrap()));
    let keys = Arc::new(KeyManager::new(
        Arc::new(InMemoryKeyStore::new()),
        clock.clone(),
        KeyManagerConfig {
            default_key_id: KeyId::new("issuer-key-1"),
            jwks_uri: Url::parse("https://issuer.example.org/keys").unwrap(),
        },
    ));
    keys.generate_key_pair("issuer-key-1", "Ed25519")
        .await
        .unwrap();

    let engine = ProofEngine::new(keys.clone(), clock.clone());
    let status = Arc::new(StatusListManager::new(
        Arc::new(InMemoryStatusStore::new()),
        StatusListConfig::default(),
    ));
    Harness {
        keys,
        engine,
        status,
    }
}

/// Allocate a revocation slot and produce the signed credential carrying
/// its status entry — the issuance path.
async fn issue(harness: &Harness, credential_id: &str) -> Value {
    let entry = harness
        .status
        .allocate_for_credential(
            CredentialId::new(credential_id),
            &IssuerId::new(ISSUER),
            StatusPurpose::Revocation,
            StatusSize::One,
        )
        .await
        .unwrap();

    let mut credential = json!({
        "id": credential_id,
        "issuer": ISSUER,
        "validFrom": "2026-01-01T00:00:00Z",
        "credentialSubject": {"id": "did:ex:alice", "achievement": "rust-basics"},
    });
    credential["credentialStatus"] = serde_json::to_value(
        entry.to_wire(format!("{ISSUER}/status/{}", entry.status_list_id)),
    )
    .unwrap();

    let proof = harness
        .engine
        .create_data_integrity_proof(&credential, None)
        .await
        .unwrap();
    ProofEngine::attach(&credential, Proof::DataIntegrity(proof))
}

#[tokio::test]
async fn issued_credential_is_valid_until_revoked() {
    let harness = harness().await;
    let credential = issue(&harness, "urn:uuid:c1").await;
    let probe = StatusListProbe {
        status: harness.status.clone(),
    };

    let outcome = harness
        .engine
        .verify_credential_validity(&credential, Some(&probe))
        .await
        .unwrap();
    assert!(outcome.is_valid, "{outcome:?}");

    // Revoke: flip the allocated bit.
    let entry = harness
        .status
        .entry_for(&CredentialId::new("urn:uuid:c1"), StatusPurpose::Revocation)
        .await
        .unwrap()
        .unwrap();
    harness
        .status
        .set_status(&entry.status_list_id, entry.index, 1)
        .await
        .unwrap();

    let outcome = harness
        .engine
        .verify_credential_validity(&credential, Some(&probe))
        .await
        .unwrap();
    assert!(!outcome.is_valid);
    assert!(outcome.has_valid_signature);
    assert_eq!(outcome.error_code, Some(ProofErrorCode::AssertionRevoked));
}

#[tokio::test]
async fn revoking_one_credential_leaves_siblings_valid() {
    let harness = harness().await;
    let first = issue(&harness, "urn:uuid:c1").await;
    let second = issue(&harness, "urn:uuid:c2").await;
    let probe = StatusListProbe {
        status: harness.status.clone(),
    };

    let entry = harness
        .status
        .entry_for(&CredentialId::new("urn:uuid:c1"), StatusPurpose::Revocation)
        .await
        .unwrap()
        .unwrap();
    harness
        .status
        .set_status(&entry.status_list_id, entry.index, 1)
        .await
        .unwrap();

    let revoked = harness
        .engine
        .verify_credential_validity(&first, Some(&probe))
        .await
        .unwrap();
    assert_eq!(revoked.error_code, Some(ProofErrorCode::AssertionRevoked));

    let live = harness
        .engine
        .verify_credential_validity(&second, Some(&probe))
        .await
        .unwrap();
    assert!(live.is_valid, "{live:?}");
}

#[tokio::test]
async fn tampered_credential_fails_before_revocation_is_consulted() {
    let harness = harness().await;
    let mut credential = issue(&harness, "urn:uuid:c1").await;
    credential["credentialSubject"]["achievement"] = json!("doctorate");
    let probe = StatusListProbe {
        status: harness.status.clone(),
    };

    let outcome = harness
        .engine
        .verify_credential_validity(&credential, Some(&probe))
        .await
        .unwrap();
    assert!(!outcome.has_valid_signature);
    assert_eq!(outcome.error_code, Some(ProofErrorCode::SignatureInvalid));
}

#[tokio::test]
async fn jwks_for_issuing_keys_exposes_no_private_parameters() {
    let harness = harness().await;
    harness
        .keys
        .generate_key_pair("issuer-key-rsa", "RSA")
        .await
        .unwrap();
    let set = harness.keys.get_public_key_set().await.unwrap();
    assert_eq!(set.keys.len(), 2);
    let json = serde_json::to_string(&set).unwrap();
    for field in ["\"d\"", "\"p\"", "\"q\"", "\"dp\"", "\"dq\"", "\"qi\""] {
        assert!(!json.contains(field), "JWKS leaked {field}: {json}");
    }
    assert!(json.contains("\"n\""));
    assert!(json.contains("\"crv\""));
}

#[tokio::test]
async fn token_and_data_integrity_proofs_verify_independently() {
    let harness = harness().await;
    let credential = issue(&harness, "urn:uuid:c1").await;
    let token = harness
        .engine
        .create_token_proof(&credential, None)
        .await
        .unwrap();
    let credential = ProofEngine::attach(&credential, Proof::Token(token));

    let outcome = harness.engine.verify_proof(&credential).await.unwrap();
    assert!(outcome.is_valid, "{outcome:?}");
}
