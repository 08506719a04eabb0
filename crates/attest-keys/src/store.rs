//! # Key Persistence Collaborator
//!
//! The [`KeyStore`] trait is the persistence seam for key records. The
//! manager owns all lifecycle and resolution logic; the store only
//! persists. [`InMemoryKeyStore`] backs tests and single-process
//! deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use attest_core::KeyId;
use parking_lot::RwLock;

use crate::error::KeyError;
use crate::keypair::{KeyPair, KeyStatus};

/// CRUD collaborator for key pairs.
///
/// Implementations persist whole [`KeyPair`] records keyed by id. Status
/// monotonicity is enforced by the manager before `update_status` is
/// called — the store applies the write blindly.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Persist a new key pair.
    async fn insert(&self, key: KeyPair) -> Result<(), KeyError>;

    /// Fetch a key pair by id.
    async fn get(&self, id: &KeyId) -> Result<Option<KeyPair>, KeyError>;

    /// All stored key pairs, in unspecified order.
    async fn list(&self) -> Result<Vec<KeyPair>, KeyError>;

    /// Overwrite the lifecycle status of an existing key.
    async fn update_status(&self, id: &KeyId, status: KeyStatus) -> Result<(), KeyError>;
}

/// In-memory key store for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<KeyId, KeyPair>>,
}

impl InMemoryKeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn insert(&self, key: KeyPair) -> Result<(), KeyError> {
        self.keys.write().insert(key.id().clone(), key);
        Ok(())
    }

    async fn get(&self, id: &KeyId) -> Result<Option<KeyPair>, KeyError> {
        Ok(self.keys.read().get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<KeyPair>, KeyError> {
        Ok(self.keys.read().values().cloned().collect())
    }

    async fn update_status(&self, id: &KeyId, status: KeyStatus) -> Result<(), KeyError> {
        let mut keys = self.keys.write();
        match keys.get(id) {
            Some(existing) => {
                let updated = existing.clone().with_status(status);
                keys.insert(id.clone(), updated);
                Ok(())
            }
            None => Err(KeyError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::KeyAlgorithm;
    use attest_core::Timestamp;

    fn pair(id: &str) -> KeyPair {
        KeyPair::generate(
            KeyId::new(id),
            KeyAlgorithm::Ed25519,
            Timestamp::parse("2026-01-15T12:00:00Z").unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = InMemoryKeyStore::new();
        store.insert(pair("k1")).await.unwrap();
        let found = store.get(&KeyId::new("k1")).await.unwrap();
        assert_eq!(found.map(|k| k.id().to_string()), Some("k1".to_string()));
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = InMemoryKeyStore::new();
        assert!(store.get(&KeyId::new("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_status_persists() {
        let store = InMemoryKeyStore::new();
        store.insert(pair("k1")).await.unwrap();
        store
            .update_status(&KeyId::new("k1"), KeyStatus::Revoked)
            .await
            .unwrap();
        let found = store.get(&KeyId::new("k1")).await.unwrap().unwrap();
        assert_eq!(found.status(), KeyStatus::Revoked);
    }

    #[tokio::test]
    async fn update_status_on_missing_key_errors() {
        let store = InMemoryKeyStore::new();
        let err = store
            .update_status(&KeyId::new("ghost"), KeyStatus::Inactive)
            .await
            .unwrap_err();
        assert!(matches!(err, KeyError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_returns_all() {
        let store = InMemoryKeyStore::new();
        store.insert(pair("a")).await.unwrap();
        store.insert(pair("b")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
    }
}
