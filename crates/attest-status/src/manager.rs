//! # Status List Manager
//!
//! Allocates indices into bit-packed status lists and mutates/queries
//! per-credential status values.
//!
//! ## Concurrency
//!
//! Two invariants are enforced with keyed async mutexes:
//!
//! 1. Allocation is linearizable per (issuer, purpose): N concurrent
//!    `allocate_index` calls yield N distinct indices.
//! 2. The decode → mutate → encode → persist cycle of `set_status` is
//!    serialized per list id, so concurrent flips of different bits in
//!    the same list cannot lose updates.
//!
//! The keyed-lock maps are `parking_lot::Mutex`-guarded and held only
//! long enough to clone out an `Arc<tokio::sync::Mutex<()>>`; the async
//! mutex is then awaited outside the sync guard.

use std::collections::HashMap;
use std::sync::Arc;

use attest_core::{CredentialId, IssuerId, StatusListId};
use parking_lot::Mutex;

use crate::bitstring::{self, StatusSize};
use crate::error::StatusError;
use crate::model::{StatusList, StatusListEntry, StatusPurpose};
use crate::store::StatusStore;

/// What to do when every list for a key is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Open a fresh list for the same (issuer, purpose, size) triple.
    CreateNewList,
    /// Surface [`StatusError::ListFull`].
    Fail,
}

/// Configuration for a [`StatusListManager`].
#[derive(Debug, Clone)]
pub struct StatusListConfig {
    /// Capacity of newly created lists, in entries.
    pub default_total_entries: u64,
    /// Exhaustion behavior.
    pub policy: CapacityPolicy,
    /// Cache lifetime hint stamped onto newly created lists, in seconds.
    pub default_ttl: Option<u64>,
}

impl Default for StatusListConfig {
    fn default() -> Self {
        Self {
            // 131072 one-bit entries pack into 16 KiB before compression,
            // the conventional minimum for herd-privacy of served lists.
            default_total_entries: 131_072,
            policy: CapacityPolicy::CreateNewList,
            default_ttl: None,
        }
    }
}

/// The result of reserving a status-list slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// The list that holds the reserved slot.
    pub status_list_id: StatusListId,
    /// The reserved index.
    pub index: u64,
}

type KeyedLocks<K> = Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>;

/// Manages bit-packed status lists behind an injected [`StatusStore`].
pub struct StatusListManager {
    store: Arc<dyn StatusStore>,
    config: StatusListConfig,
    alloc_locks: KeyedLocks<(IssuerId, StatusPurpose)>,
    list_locks: KeyedLocks<StatusListId>,
}

impl StatusListManager {
    /// Create a manager over the given store.
    pub fn new(store: Arc<dyn StatusStore>, config: StatusListConfig) -> Self {
        Self {
            store,
            config,
            alloc_locks: Mutex::new(HashMap::new()),
            list_locks: Mutex::new(HashMap::new()),
        }
    }

    fn alloc_lock(&self, issuer: &IssuerId, purpose: StatusPurpose) -> Arc<tokio::sync::Mutex<()>> {
        self.alloc_locks
            .lock()
            .entry((issuer.clone(), purpose))
            .or_default()
            .clone()
    }

    fn list_lock(&self, id: StatusListId) -> Arc<tokio::sync::Mutex<()>> {
        self.list_locks.lock().entry(id).or_default().clone()
    }

    /// Reserve the next free index in a list for the (issuer, purpose,
    /// size) triple, creating the first list on demand.
    ///
    /// Linearizable per (issuer, purpose): the whole find-reserve-persist
    /// sequence runs under a keyed mutex, so concurrent callers never
    /// receive the same index and an existing index is never overwritten.
    ///
    /// When every list is full, [`CapacityPolicy::CreateNewList`] opens a
    /// fresh one and [`CapacityPolicy::Fail`] surfaces
    /// [`StatusError::ListFull`].
    pub async fn allocate_index(
        &self,
        issuer: &IssuerId,
        purpose: StatusPurpose,
        status_size: StatusSize,
    ) -> Result<Allocation, StatusError> {
        let lock = self.alloc_lock(issuer, purpose);
        let _guard = lock.lock().await;

        let lists = self.store.find_lists(issuer, purpose, status_size).await?;
        if let Some(mut list) = lists.iter().find(|l| !l.is_full()).cloned() {
            let index = list.used_entries;
            list.used_entries += 1;
            self.store.update_list(&list).await?;
            return Ok(Allocation {
                status_list_id: list.id,
                index,
            });
        }

        if !lists.is_empty() && self.config.policy == CapacityPolicy::Fail {
            return Err(StatusError::ListFull {
                issuer: issuer.to_string(),
                purpose: purpose.to_string(),
            });
        }

        // First list for this triple, or rollover under CreateNewList.
        let mut list = StatusList::new(
            issuer.clone(),
            purpose,
            status_size,
            self.config.default_total_entries,
        )?;
        list.ttl = self.config.default_ttl;
        list.used_entries = 1;
        let allocation = Allocation {
            status_list_id: list.id,
            index: 0,
        };
        tracing::debug!(
            issuer = %issuer,
            purpose = %purpose,
            list_id = %list.id,
            "opened new status list"
        );
        self.store.insert_list(list).await?;
        Ok(allocation)
    }

    /// Allocate a slot and record the credential's entry pointer.
    pub async fn allocate_for_credential(
        &self,
        credential_id: CredentialId,
        issuer: &IssuerId,
        purpose: StatusPurpose,
        status_size: StatusSize,
    ) -> Result<StatusListEntry, StatusError> {
        let allocation = self.allocate_index(issuer, purpose, status_size).await?;
        let entry = StatusListEntry {
            credential_id,
            status_list_id: allocation.status_list_id,
            index: allocation.index,
            status_size,
            purpose,
        };
        self.store.insert_entry(entry.clone()).await?;
        Ok(entry)
    }

    /// Flip the `status_size`-bit slot at `index` to `value`.
    ///
    /// The decode → mutate → encode → persist cycle runs under the
    /// per-list mutex.
    pub async fn set_status(
        &self,
        list_id: &StatusListId,
        index: u64,
        value: u8,
    ) -> Result<(), StatusError> {
        let lock = self.list_lock(*list_id);
        let _guard = lock.lock().await;

        let mut list = self
            .store
            .get_list(list_id)
            .await?
            .ok_or(StatusError::UnknownList(*list_id))?;

        if value > list.status_size.max_value() {
            return Err(StatusError::InvalidStatusValue {
                value,
                bits: list.status_size.bits(),
                max: list.status_size.max_value(),
            });
        }
        if index >= list.total_entries {
            return Err(StatusError::IndexOutOfRange {
                index,
                total_entries: list.total_entries,
            });
        }

        let mut bytes = bitstring::decode(&list.encoded_list)?;
        bitstring::set_entry(&mut bytes, index, list.status_size, value);
        list.encoded_list = bitstring::encode(&bytes)?;
        self.store.update_list(&list).await
    }

    /// Read the value at `index`.
    pub async fn get_status(&self, list_id: &StatusListId, index: u64) -> Result<u8, StatusError> {
        let list = self
            .store
            .get_list(list_id)
            .await?
            .ok_or(StatusError::UnknownList(*list_id))?;
        if index >= list.total_entries {
            return Err(StatusError::IndexOutOfRange {
                index,
                total_entries: list.total_entries,
            });
        }
        let bytes = bitstring::decode(&list.encoded_list)?;
        Ok(bitstring::get_entry(&bytes, index, list.status_size))
    }

    /// Fetch the stored list record (for serving as a document).
    pub async fn get_list(&self, list_id: &StatusListId) -> Result<StatusList, StatusError> {
        self.store
            .get_list(list_id)
            .await?
            .ok_or(StatusError::UnknownList(*list_id))
    }

    /// The stored entry pointer for a credential, if one was allocated.
    pub async fn entry_for(
        &self,
        credential: &CredentialId,
        purpose: StatusPurpose,
    ) -> Result<Option<StatusListEntry>, StatusError> {
        self.store.get_entry(credential, purpose).await
    }
}
