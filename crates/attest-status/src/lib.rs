#![deny(missing_docs)]

//! # attest-status — Bit-Packed Status Lists
//!
//! Compact revocation/suspension state for issued credentials: each
//! credential owns a fixed index into a bit-packed list, and flipping a
//! credential's status is a sub-byte mutation of that list.
//!
//! ## Invariants
//!
//! - `decode(encode(bits)) == bits` — the codec is lossless.
//! - Concurrent allocations for the same (issuer, purpose) never share
//!   an index.
//! - The decode → mutate → encode → persist cycle is serialized per list.
//! - An allocated index is never moved and never silently overwritten.
//! - All counts and indices are true integers end to end; only the wire
//!   entry renders its index as a string.

pub mod bitstring;
pub mod error;
pub mod manager;
pub mod model;
pub mod store;

pub use bitstring::StatusSize;
pub use error::StatusError;
pub use manager::{Allocation, CapacityPolicy, StatusListConfig, StatusListManager};
pub use model::{StatusList, StatusListEntry, StatusPurpose, WireStatusListEntry};
pub use store::{InMemoryStatusStore, StatusStore};
