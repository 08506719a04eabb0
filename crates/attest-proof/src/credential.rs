//! # Credential Accessors
//!
//! Credentials are open-world JSON documents — issuers attach arbitrary
//! claims — so this module provides typed access to the handful of
//! fields the engine cares about instead of forcing a closed struct.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use attest_core::Timestamp;

use crate::proof::Proof;

/// The member name that carries proofs.
pub const PROOF_MEMBER: &str = "proof";

/// A credential's embedded pointer into a status list, as found in the
/// `credentialStatus` member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatusRef {
    /// Entry type, e.g. `BitstringStatusListEntry`.
    #[serde(rename = "type")]
    pub entry_type: String,
    /// What the entry means (`revocation`, `suspension`).
    pub status_purpose: String,
    /// The index, string-rendered on the wire.
    pub status_list_index: String,
    /// URI of the served status-list document.
    pub status_list_credential: String,
    /// Bits per entry, when declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_size: Option<u8>,
}

impl CredentialStatusRef {
    /// The wire index parsed back to a true integer.
    pub fn index(&self) -> Option<u64> {
        self.status_list_index.parse().ok()
    }
}

/// The credential document minus its `proof` member — the exact bytes a
/// proof signs over.
pub fn without_proof(credential: &Value) -> Value {
    let mut stripped = credential.clone();
    if let Some(obj) = stripped.as_object_mut() {
        obj.remove(PROOF_MEMBER);
    }
    stripped
}

/// Parse every proof attached to a credential.
///
/// The `proof` member may be a single object or an array. Returns `None`
/// when the member is absent, not an object/array, or any element fails
/// to parse — callers surface that as a malformed proof.
pub fn proofs(credential: &Value) -> Option<Vec<Proof>> {
    let member = credential.get(PROOF_MEMBER)?;
    let raw: Vec<&Value> = match member {
        Value::Object(_) => vec![member],
        Value::Array(items) if !items.is_empty() => items.iter().collect(),
        _ => return None,
    };
    raw.into_iter()
        .map(|v| serde_json::from_value(v.clone()).ok())
        .collect()
}

/// The credential's expiry, from `validUntil` (data model v2) or
/// `expires` (v1), if present and parseable.
pub fn expiry(credential: &Value) -> Option<Timestamp> {
    ["validUntil", "expires"]
        .iter()
        .find_map(|field| credential.get(*field))
        .and_then(Value::as_str)
        .and_then(Timestamp::parse)
}

/// Whether the credential carries a local `revoked: true` flag.
pub fn locally_revoked(credential: &Value) -> bool {
    credential
        .get("revoked")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Every status-list pointer attached to the credential.
///
/// The `credentialStatus` member may be a single object or an array;
/// unparseable entries are skipped.
pub fn status_refs(credential: &Value) -> Vec<CredentialStatusRef> {
    let member = match credential.get("credentialStatus") {
        Some(v) => v,
        None => return Vec::new(),
    };
    let raw: Vec<&Value> = match member {
        Value::Object(_) => vec![member],
        Value::Array(items) => items.iter().collect(),
        _ => return Vec::new(),
    };
    raw.into_iter()
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect()
}

/// The issuer identity: a plain string or the `id` of an issuer object.
pub fn issuer_id(credential: &Value) -> Option<String> {
    match credential.get("issuer")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// The subject identity: `credentialSubject.id`, falling back to the
/// credential's own `id`.
pub fn subject_id(credential: &Value) -> Option<String> {
    credential
        .get("credentialSubject")
        .and_then(|s| s.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            credential
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
}

/// The credential's own `id`.
pub fn credential_id(credential: &Value) -> Option<String> {
    credential
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
}
