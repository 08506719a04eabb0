//! # Bitstring Codec
//!
//! Packs status entries contiguously into a byte array at bit
//! granularity, compresses with gzip, and base64url-encodes for
//! embedding in a credential or serving as a standalone document.
//!
//! ## Layout
//!
//! Entries are MSB-first within each byte: entry 0 of a 1-bit list is
//! the top bit of byte 0. The supported widths (1, 2, 4, 8) all divide
//! 8, so an entry never straddles a byte boundary — the shift/mask
//! arithmetic below relies on that.

use std::io::{Read, Write};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StatusError;

/// Bits per status entry. Closed set: 1, 2, 4, or 8.
///
/// Serializes as the plain integer — bit arithmetic downstream depends
/// on this never becoming a stringified number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusSize {
    /// One bit per entry (plain revoked/not-revoked).
    One,
    /// Two bits per entry.
    Two,
    /// Four bits per entry.
    Four,
    /// Eight bits per entry (a full status byte).
    Eight,
}

impl StatusSize {
    /// The bit width as an integer.
    pub fn bits(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// The largest value representable in this width: `2^bits - 1`.
    pub fn max_value(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 3,
            Self::Four => 15,
            Self::Eight => 255,
        }
    }

    /// Parse a bit width, rejecting anything outside the closed set.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            4 => Some(Self::Four),
            8 => Some(Self::Eight),
            _ => None,
        }
    }
}

impl Serialize for StatusSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for StatusSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Self::from_bits(bits)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid status size: {bits}")))
    }
}

impl std::fmt::Display for StatusSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// The number of bytes needed to hold `total_entries` entries.
pub fn capacity_bytes(total_entries: u64, size: StatusSize) -> usize {
    ((total_entries * size.bits() as u64 + 7) / 8) as usize
}

/// Extract the value at `index` from a packed byte array.
///
/// The caller validates `index` against the list capacity; out-of-range
/// reads here are a logic error.
pub fn get_entry(bytes: &[u8], index: u64, size: StatusSize) -> u8 {
    let offset = index * size.bits() as u64;
    let byte = (offset / 8) as usize;
    let within = (offset % 8) as u8;
    let shift = 8 - size.bits() - within;
    (bytes[byte] >> shift) & size.max_value()
}

/// Write `value` into the `size`-bit slot at `index`.
///
/// The caller validates both `index` and `value`; this helper only
/// performs the shift/mask arithmetic.
pub fn set_entry(bytes: &mut [u8], index: u64, size: StatusSize, value: u8) {
    debug_assert!(value <= size.max_value());
    let offset = index * size.bits() as u64;
    let byte = (offset / 8) as usize;
    let within = (offset % 8) as u8;
    let shift = 8 - size.bits() - within;
    let mask = size.max_value() << shift;
    bytes[byte] = (bytes[byte] & !mask) | ((value << shift) & mask);
}

/// Compress and transport-encode a packed byte array.
pub fn encode(bytes: &[u8]) -> Result<String, StatusError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .map_err(|e| StatusError::Codec(format!("compression failed: {e}")))?;
    let compressed = encoder
        .finish()
        .map_err(|e| StatusError::Codec(format!("compression failed: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// The exact inverse of [`encode`].
pub fn decode(encoded: &str) -> Result<Vec<u8>, StatusError> {
    let compressed = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| StatusError::Codec(format!("base64url decode failed: {e}")))?;
    let mut bytes = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut bytes)
        .map_err(|e| StatusError::Codec(format!("decompression failed: {e}")))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL_SIZES: [StatusSize; 4] = [
        StatusSize::One,
        StatusSize::Two,
        StatusSize::Four,
        StatusSize::Eight,
    ];

    #[test]
    fn capacity_rounds_up() {
        assert_eq!(capacity_bytes(8, StatusSize::One), 1);
        assert_eq!(capacity_bytes(9, StatusSize::One), 2);
        assert_eq!(capacity_bytes(3, StatusSize::Two), 1);
        assert_eq!(capacity_bytes(5, StatusSize::Four), 3);
        assert_eq!(capacity_bytes(4, StatusSize::Eight), 4);
    }

    #[test]
    fn set_then_get_every_size() {
        for size in ALL_SIZES {
            let entries = 16u64;
            let mut bytes = vec![0u8; capacity_bytes(entries, size)];
            for index in 0..entries {
                let value = (index as u8) & size.max_value();
                set_entry(&mut bytes, index, size, value);
            }
            for index in 0..entries {
                let expected = (index as u8) & size.max_value();
                assert_eq!(
                    get_entry(&bytes, index, size),
                    expected,
                    "size {size} index {index}"
                );
            }
        }
    }

    #[test]
    fn set_does_not_disturb_neighbors() {
        let mut bytes = vec![0u8; 1];
        set_entry(&mut bytes, 3, StatusSize::One, 1);
        assert_eq!(bytes[0], 0b0001_0000);
        set_entry(&mut bytes, 0, StatusSize::One, 1);
        assert_eq!(bytes[0], 0b1001_0000);
        set_entry(&mut bytes, 3, StatusSize::One, 0);
        assert_eq!(bytes[0], 0b1000_0000);
    }

    #[test]
    fn two_bit_entries_pack_msb_first() {
        let mut bytes = vec![0u8; 1];
        set_entry(&mut bytes, 0, StatusSize::Two, 0b11);
        set_entry(&mut bytes, 3, StatusSize::Two, 0b01);
        assert_eq!(bytes[0], 0b1100_0001);
    }

    #[test]
    fn overwrite_replaces_full_slot() {
        let mut bytes = vec![0u8; 1];
        set_entry(&mut bytes, 1, StatusSize::Four, 0b1111);
        set_entry(&mut bytes, 1, StatusSize::Four, 0b0101);
        assert_eq!(get_entry(&bytes, 1, StatusSize::Four), 0b0101);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = encode(&bytes).unwrap();
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
        assert_eq!(decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        assert!(decode("!!!not-base64!!!").is_err());
    }

    #[test]
    fn decode_rejects_uncompressed_payload() {
        let encoded = URL_SAFE_NO_PAD.encode(b"plain bytes, no gzip framing");
        assert!(decode(&encoded).is_err());
    }

    #[test]
    fn status_size_serde_is_integer() {
        let json = serde_json::to_string(&StatusSize::Four).unwrap();
        assert_eq!(json, "4");
        let parsed: StatusSize = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, StatusSize::Two);
        assert!(serde_json::from_str::<StatusSize>("3").is_err());
        assert!(serde_json::from_str::<StatusSize>("\"1\"").is_err());
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary_bitstrings(bytes in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let encoded = encode(&bytes).unwrap();
            prop_assert_eq!(decode(&encoded).unwrap(), bytes);
        }

        #[test]
        fn packed_values_survive_codec(
            values in proptest::collection::vec(0u8..=15, 1..256)
        ) {
            let size = StatusSize::Four;
            let mut bytes = vec![0u8; capacity_bytes(values.len() as u64, size)];
            for (i, v) in values.iter().enumerate() {
                set_entry(&mut bytes, i as u64, size, *v);
            }
            let restored = decode(&encode(&bytes).unwrap()).unwrap();
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(get_entry(&restored, i as u64, size), *v);
            }
        }
    }
}
