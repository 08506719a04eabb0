//! # Canonical Serialization — JCS-Compatible Canonicalization
//!
//! This module defines [`CanonicalBytes`], the sole construction path for
//! bytes used in digest and signature computation across the attest stack.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only way to construct
//! `CanonicalBytes` is through [`CanonicalBytes::new()`], which applies the
//! full coercion pipeline before serialization. Signing non-canonical bytes
//! is therefore structurally impossible: a proof produced here verifies
//! against a re-canonicalization of the same document, and any mutation of
//! a signed field changes the canonical form.
//!
//! ## Canonicalization Rules
//!
//! 1. Normalize RFC 3339 datetime strings to UTC with a `Z` suffix,
//!    truncated to seconds.
//! 2. Sort object keys lexicographically.
//! 3. Use compact separators (no whitespace).

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS-compatible canonicalization.
///
/// The inner `Vec<u8>` is private — downstream code cannot construct
/// `CanonicalBytes` except through [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// This is the ONLY way to construct `CanonicalBytes`. All signature
    /// and digest computation in the stack must flow through this
    /// constructor.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let coerced = coerce_json_value(value);
        let bytes = serialize_canonical(&coerced)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively coerce JSON values according to the canonicalization rules.
fn coerce_json_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            // Entries are re-inserted in sorted order, so the output is
            // key-sorted regardless of the map implementation backing
            // `serde_json::Map` in the final dependency graph.
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut coerced = serde_json::Map::new();
            for (k, v) in entries {
                coerced.insert(k, coerce_json_value(v));
            }
            Value::Object(coerced)
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(coerce_json_value).collect()),
        Value::String(s) => {
            // Datetime normalization: if the string parses as RFC 3339,
            // normalize to UTC with Z suffix, truncated to seconds.
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
                let utc = dt.with_timezone(&chrono::Utc);
                Value::String(utc.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            } else {
                Value::String(s)
            }
        }
        // Numbers, bools, and null pass through unchanged.
        other => other,
    }
}

/// Serialize a JSON value with compact separators. Key order was fixed
/// by [`coerce_json_value`].
fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    Ok(serde_json::to_vec(value)?)
}
