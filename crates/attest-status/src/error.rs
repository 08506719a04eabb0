//! # Status List Error Types
//!
//! Structured errors for allocation, mutation, and the bitstring codec.

use thiserror::Error;

use attest_core::StatusListId;

/// Errors from status-list operations.
#[derive(Error, Debug)]
pub enum StatusError {
    /// Every list for the (issuer, purpose) pair is exhausted and the
    /// configured policy forbids opening a new one.
    #[error("status list capacity exhausted for issuer \"{issuer}\" purpose \"{purpose}\"")]
    ListFull {
        /// The issuer whose lists are exhausted.
        issuer: String,
        /// The status purpose being allocated.
        purpose: String,
    },

    /// The value does not fit in the list's per-entry bit width.
    #[error("status value {value} out of range for {bits}-bit entries (max {max})")]
    InvalidStatusValue {
        /// The rejected value.
        value: u8,
        /// Bits per entry for the target list.
        bits: u8,
        /// Largest representable value.
        max: u8,
    },

    /// The index lies beyond the list's capacity.
    #[error("index {index} out of range for list with {total_entries} entries")]
    IndexOutOfRange {
        /// The rejected index.
        index: u64,
        /// The list's capacity.
        total_entries: u64,
    },

    /// No list with the given id exists.
    #[error("unknown status list: {0}")]
    UnknownList(StatusListId),

    /// The encoded bitstring could not be decoded (corrupt base64 or
    /// compression framing).
    #[error("bitstring codec error: {0}")]
    Codec(String),

    /// The persistence collaborator failed.
    #[error("status store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_full_names_issuer_and_purpose() {
        let err = StatusError::ListFull {
            issuer: "https://issuer.example.org".to_string(),
            purpose: "revocation".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("issuer.example.org"));
        assert!(msg.contains("revocation"));
    }

    #[test]
    fn invalid_value_shows_bounds() {
        let err = StatusError::InvalidStatusValue {
            value: 4,
            bits: 2,
            max: 3,
        };
        let msg = format!("{err}");
        assert!(msg.contains('4'));
        assert!(msg.contains("max 3"));
    }

    #[test]
    fn index_out_of_range_shows_capacity() {
        let err = StatusError::IndexOutOfRange {
            index: 8,
            total_entries: 8,
        };
        assert!(format!("{err}").contains("8 entries"));
    }
}
