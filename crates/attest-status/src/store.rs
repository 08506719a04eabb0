//! # Status Persistence Collaborator
//!
//! The [`StatusStore`] trait is the persistence seam for status lists
//! and entry pointers. The manager owns all allocation and mutation
//! logic; the store only persists records.

use std::collections::HashMap;

use async_trait::async_trait;
use attest_core::{CredentialId, IssuerId, StatusListId};
use parking_lot::RwLock;

use crate::bitstring::StatusSize;
use crate::error::StatusError;
use crate::model::{StatusList, StatusListEntry, StatusPurpose};

/// CRUD collaborator for status lists and entry pointers.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Persist a new list.
    async fn insert_list(&self, list: StatusList) -> Result<(), StatusError>;

    /// Fetch a list by id.
    async fn get_list(&self, id: &StatusListId) -> Result<Option<StatusList>, StatusError>;

    /// Overwrite an existing list record (encoded bitstring and counts).
    async fn update_list(&self, list: &StatusList) -> Result<(), StatusError>;

    /// All lists for an (issuer, purpose, size) triple, oldest first.
    async fn find_lists(
        &self,
        issuer: &IssuerId,
        purpose: StatusPurpose,
        status_size: StatusSize,
    ) -> Result<Vec<StatusList>, StatusError>;

    /// Persist a credential's entry pointer.
    async fn insert_entry(&self, entry: StatusListEntry) -> Result<(), StatusError>;

    /// Fetch the entry pointer for a credential and purpose.
    async fn get_entry(
        &self,
        credential: &CredentialId,
        purpose: StatusPurpose,
    ) -> Result<Option<StatusListEntry>, StatusError>;
}

/// In-memory status store for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryStatusStore {
    lists: RwLock<Vec<StatusList>>,
    entries: RwLock<HashMap<(CredentialId, StatusPurpose), StatusListEntry>>,
}

impl InMemoryStatusStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn insert_list(&self, list: StatusList) -> Result<(), StatusError> {
        self.lists.write().push(list);
        Ok(())
    }

    async fn get_list(&self, id: &StatusListId) -> Result<Option<StatusList>, StatusError> {
        Ok(self.lists.read().iter().find(|l| l.id == *id).cloned())
    }

    async fn update_list(&self, list: &StatusList) -> Result<(), StatusError> {
        let mut lists = self.lists.write();
        match lists.iter_mut().find(|l| l.id == list.id) {
            Some(existing) => {
                *existing = list.clone();
                Ok(())
            }
            None => Err(StatusError::UnknownList(list.id)),
        }
    }

    async fn find_lists(
        &self,
        issuer: &IssuerId,
        purpose: StatusPurpose,
        status_size: StatusSize,
    ) -> Result<Vec<StatusList>, StatusError> {
        Ok(self
            .lists
            .read()
            .iter()
            .filter(|l| {
                l.issuer_id == *issuer && l.purpose == purpose && l.status_size == status_size
            })
            .cloned()
            .collect())
    }

    async fn insert_entry(&self, entry: StatusListEntry) -> Result<(), StatusError> {
        self.entries
            .write()
            .insert((entry.credential_id.clone(), entry.purpose), entry);
        Ok(())
    }

    async fn get_entry(
        &self,
        credential: &CredentialId,
        purpose: StatusPurpose,
    ) -> Result<Option<StatusListEntry>, StatusError> {
        Ok(self
            .entries
            .read()
            .get(&(credential.clone(), purpose))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> IssuerId {
        IssuerId::new("https://issuer.example.org")
    }

    #[tokio::test]
    async fn insert_and_find_lists_filters_by_triple() {
        let store = InMemoryStatusStore::new();
        let l1 = StatusList::new(issuer(), StatusPurpose::Revocation, StatusSize::One, 8).unwrap();
        let l2 = StatusList::new(issuer(), StatusPurpose::Suspension, StatusSize::One, 8).unwrap();
        store.insert_list(l1).await.unwrap();
        store.insert_list(l2).await.unwrap();

        let found = store
            .find_lists(&issuer(), StatusPurpose::Revocation, StatusSize::One)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].purpose, StatusPurpose::Revocation);
    }

    #[tokio::test]
    async fn update_unknown_list_errors() {
        let store = InMemoryStatusStore::new();
        let list = StatusList::new(issuer(), StatusPurpose::Revocation, StatusSize::One, 8).unwrap();
        let err = store.update_list(&list).await.unwrap_err();
        assert!(matches!(err, StatusError::UnknownList(_)));
    }

    #[tokio::test]
    async fn entry_roundtrip() {
        let store = InMemoryStatusStore::new();
        let list = StatusList::new(issuer(), StatusPurpose::Revocation, StatusSize::One, 8).unwrap();
        let entry = StatusListEntry {
            credential_id: CredentialId::new("urn:uuid:c1"),
            status_list_id: list.id,
            index: 0,
            status_size: StatusSize::One,
            purpose: StatusPurpose::Revocation,
        };
        store.insert_entry(entry).await.unwrap();

        let found = store
            .get_entry(&CredentialId::new("urn:uuid:c1"), StatusPurpose::Revocation)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.index, 0);

        let missing = store
            .get_entry(&CredentialId::new("urn:uuid:c1"), StatusPurpose::Suspension)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
