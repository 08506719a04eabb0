//! # Status List Records
//!
//! Persistence-shaped records for status lists and the per-credential
//! entry pointers, plus the wire form embedded in issued credentials.
//!
//! All counts (`total_entries`, `used_entries`, `index`, `ttl`) are true
//! integers in every representation except the wire entry's
//! `statusListIndex`, which the surrounding ecosystem renders as a
//! string.

use serde::{Deserialize, Serialize};

use attest_core::{CredentialId, IssuerId, StatusListId};

use crate::bitstring::{self, StatusSize};
use crate::error::StatusError;

/// What a list's entries mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPurpose {
    /// Entries mark credentials as revoked (terminal).
    Revocation,
    /// Entries mark credentials as suspended (reversible).
    Suspension,
}

impl StatusPurpose {
    /// The lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revocation => "revocation",
            Self::Suspension => "suspension",
        }
    }
}

impl std::fmt::Display for StatusPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bit-packed status list record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusList {
    /// Unique list identifier.
    pub id: StatusListId,
    /// The issuer whose credentials point into this list.
    pub issuer_id: IssuerId,
    /// What the entries mean.
    pub purpose: StatusPurpose,
    /// Bits per entry.
    pub status_size: StatusSize,
    /// Capacity in entries.
    pub total_entries: u64,
    /// Allocated entries; `0 <= used_entries <= total_entries`.
    pub used_entries: u64,
    /// The packed, compressed, base64url-encoded bitstring.
    pub encoded_list: String,
    /// Optional cache lifetime hint, in seconds, for served documents.
    pub ttl: Option<u64>,
}

impl StatusList {
    /// Create an empty list with every entry zeroed.
    pub fn new(
        issuer_id: IssuerId,
        purpose: StatusPurpose,
        status_size: StatusSize,
        total_entries: u64,
    ) -> Result<Self, StatusError> {
        let zeroed = vec![0u8; bitstring::capacity_bytes(total_entries, status_size)];
        Ok(Self {
            id: StatusListId::new(),
            issuer_id,
            purpose,
            status_size,
            total_entries,
            used_entries: 0,
            encoded_list: bitstring::encode(&zeroed)?,
            ttl: None,
        })
    }

    /// Whether every index has been allocated.
    pub fn is_full(&self) -> bool {
        self.used_entries >= self.total_entries
    }
}

/// A credential's pointer into a status list.
///
/// Created once at issuance time via allocation; the index never moves,
/// only the referenced bit value changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusListEntry {
    /// The credential this entry belongs to.
    pub credential_id: CredentialId,
    /// The list holding the entry.
    pub status_list_id: StatusListId,
    /// The allocated index.
    pub index: u64,
    /// Bits per entry (copied from the list for self-contained reads).
    pub status_size: StatusSize,
    /// What the entry means.
    pub purpose: StatusPurpose,
}

impl StatusListEntry {
    /// The wire form embedded in an issued credential.
    ///
    /// `status_list_credential` is the URI where the list document is
    /// served, typically `{base}/{list_id}`.
    pub fn to_wire(&self, status_list_credential: String) -> WireStatusListEntry {
        WireStatusListEntry {
            entry_type: "BitstringStatusListEntry".to_string(),
            status_purpose: self.purpose,
            status_list_index: self.index.to_string(),
            status_list_credential,
            status_size: self.status_size,
        }
    }
}

/// The credential-embedded status entry shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStatusListEntry {
    /// Always `BitstringStatusListEntry`.
    #[serde(rename = "type")]
    pub entry_type: String,
    /// What the entry means.
    pub status_purpose: StatusPurpose,
    /// The index, string-rendered on the wire.
    pub status_list_index: String,
    /// URI of the served status-list document.
    pub status_list_credential: String,
    /// Bits per entry.
    pub status_size: StatusSize,
}
