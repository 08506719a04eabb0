//! # Key Manager
//!
//! Owns the key lifecycle: generation, status transitions, the public
//! JWKS document, and verification-method resolution.
//!
//! ## Resolution Leniency
//!
//! `resolve_key` deliberately falls back to the configured default key
//! when a reference is malformed or carries no key-id fragment. Only an
//! explicit, well-formed key id that cannot be resolved hard-fails. The
//! fallback is a documented branch and is logged — see [`KeyManager::resolve_key`].

use std::sync::Arc;

use attest_core::{Clock, KeyId};
use url::Url;

use crate::algorithm::KeyAlgorithm;
use crate::error::KeyError;
use crate::jwks::{Jwk, JwkSet};
use crate::keypair::{KeyPair, KeyStatus};
use crate::store::KeyStore;

/// What a resolved key will be used for.
///
/// Signing requires an Active key. Verification accepts inactive and
/// revoked keys as well — historical signatures must stay verifiable
/// after a key is retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    /// The key will produce a new signature.
    Signing,
    /// The key will verify an existing signature.
    Verification,
}

/// Configuration for a [`KeyManager`].
#[derive(Debug, Clone)]
pub struct KeyManagerConfig {
    /// The key used when a reference names no explicit key.
    pub default_key_id: KeyId,
    /// Public URL of the JWKS document; key references are minted as
    /// `{jwks_uri}#{kid}`.
    pub jwks_uri: Url,
}

/// Manages issuer key pairs behind an injected [`KeyStore`].
pub struct KeyManager {
    store: Arc<dyn KeyStore>,
    clock: Arc<dyn Clock>,
    config: KeyManagerConfig,
}

impl KeyManager {
    /// Create a manager over the given store and clock.
    pub fn new(store: Arc<dyn KeyStore>, clock: Arc<dyn Clock>, config: KeyManagerConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// The configured default key id.
    pub fn default_key_id(&self) -> &KeyId {
        &self.config.default_key_id
    }

    /// Mint the verification-method reference for a key.
    pub fn verification_method(&self, id: &KeyId) -> String {
        format!("{}#{}", self.config.jwks_uri, id)
    }

    /// Generate and persist a new key pair.
    ///
    /// The `algorithm` argument is an externally supplied name (`"RSA"`,
    /// `"RS256"`, `"Ed25519"`, ...). Fails with [`KeyError::Generation`]
    /// when the algorithm is unsupported or `id` collides with an
    /// existing non-revoked key. Generation itself runs under
    /// `spawn_blocking` so RSA keygen cannot stall concurrent
    /// verification tasks.
    pub async fn generate_key_pair(&self, id: &str, algorithm: &str) -> Result<KeyPair, KeyError> {
        let alg = KeyAlgorithm::parse(algorithm).ok_or_else(|| KeyError::Generation {
            id: id.to_string(),
            reason: format!("unsupported algorithm \"{algorithm}\""),
        })?;

        let key_id = KeyId::new(id);
        if let Some(existing) = self.store.get(&key_id).await? {
            if existing.status() != KeyStatus::Revoked {
                return Err(KeyError::Generation {
                    id: id.to_string(),
                    reason: "id collides with an existing non-revoked key".to_string(),
                });
            }
        }

        let created_at = self.clock.now();
        let generated = tokio::task::spawn_blocking(move || {
            KeyPair::generate(key_id, alg, created_at)
        })
        .await
        .map_err(|e| KeyError::Generation {
            id: id.to_string(),
            reason: format!("generation task failed: {e}"),
        })??;

        self.store.insert(generated.clone()).await?;
        tracing::debug!(key_id = id, algorithm = %alg, "generated key pair");
        Ok(generated)
    }

    /// The JWKS document: active keys only, public fields only.
    pub async fn get_public_key_set(&self) -> Result<JwkSet, KeyError> {
        let mut keys: Vec<Jwk> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|k| k.status() == KeyStatus::Active)
            .map(|k| Jwk::from_key_pair(&k))
            .collect();
        keys.sort_by(|a, b| a.kid.cmp(&b.kid));
        Ok(JwkSet { keys })
    }

    /// Apply a one-way status transition.
    ///
    /// Rejects any move backwards in the Active → Inactive → Revoked
    /// lifecycle with [`KeyError::InvalidTransition`].
    pub async fn set_key_status(&self, id: &KeyId, status: KeyStatus) -> Result<(), KeyError> {
        let key = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| KeyError::NotFound(id.to_string()))?;
        if !key.status().can_transition(status) {
            return Err(KeyError::InvalidTransition {
                id: id.to_string(),
                from: key.status(),
                to: status,
            });
        }
        self.store.update_status(id, status).await
    }

    /// Resolve a verification-method reference to a key pair.
    ///
    /// The reference is a URI optionally ending in a `#kid` fragment.
    /// Resolution rules:
    ///
    /// - No reference, or a reference without a fragment: the default key.
    /// - A malformed reference (unparseable, empty fragment): the default
    ///   key. This leniency is deliberate and logged — a latent gap
    ///   inherited from the issuing profile this stack implements, kept
    ///   visible here rather than silently hard-failed.
    /// - An explicit fragment naming the default key: the default key.
    /// - An explicit fragment naming another key: that key, or
    ///   [`KeyError::NotFound`] if it is absent or unusable for `usage`.
    ///
    /// `usage` gates status: signing requires Active; verification also
    /// accepts Inactive and Revoked keys (historical signatures).
    pub async fn resolve_key(
        &self,
        reference: Option<&str>,
        usage: KeyUsage,
    ) -> Result<KeyPair, KeyError> {
        let explicit_kid = match reference {
            None => None,
            Some(r) => match r.rsplit_once('#') {
                Some((_, kid)) if !kid.is_empty() => Some(kid.to_string()),
                Some((_, _)) => {
                    tracing::warn!(reference = r, "empty key fragment, falling back to default key");
                    None
                }
                None => {
                    if Url::parse(r).is_err() {
                        tracing::warn!(
                            reference = r,
                            "malformed verification method, falling back to default key"
                        );
                    }
                    None
                }
            },
        };

        match explicit_kid {
            Some(kid) if kid != self.config.default_key_id.as_str() => {
                let key_id = KeyId::new(kid.as_str());
                let key = self
                    .store
                    .get(&key_id)
                    .await?
                    .filter(|k| usable_for(k, usage))
                    .ok_or(KeyError::NotFound(kid))?;
                Ok(key)
            }
            _ => {
                let key = self
                    .store
                    .get(&self.config.default_key_id)
                    .await?
                    .filter(|k| usable_for(k, usage))
                    .ok_or_else(|| KeyError::NotFound(self.config.default_key_id.to_string()))?;
                Ok(key)
            }
        }
    }
}

/// Whether a key's status permits the requested usage.
fn usable_for(key: &KeyPair, usage: KeyUsage) -> bool {
    match usage {
        KeyUsage::Signing => key.status() == KeyStatus::Active,
        KeyUsage::Verification => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryKeyStore;
    use attest_core::{FixedClock, Timestamp};

    fn manager() -> KeyManager {
        let clock = FixedClock(Timestamp::parse("2026-01-15T12:00:00Z").unwrap());
        KeyManager::new(
            Arc::new(InMemoryKeyStore::new()),
            Arc::new(clock),
            KeyManagerConfig {
                default_key_id: KeyId::new("default"),
                jwks_uri: Url::parse("https://issuer.example.org/keys").unwrap(),
            },
        )
    }

    #[tokio::test]
    async fn generate_rejects_unsupported_algorithm() {
        let mgr = manager();
        let err = mgr.generate_key_pair("k1", "P-256").await.unwrap_err();
        match err {
            KeyError::Generation { reason, .. } => assert!(reason.contains("unsupported")),
            other => panic!("expected Generation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_rejects_id_collision_with_live_key() {
        let mgr = manager();
        mgr.generate_key_pair("k1", "Ed25519").await.unwrap();
        let err = mgr.generate_key_pair("k1", "Ed25519").await.unwrap_err();
        assert!(matches!(err, KeyError::Generation { .. }));
    }

    #[tokio::test]
    async fn generate_allows_reusing_revoked_id() {
        let mgr = manager();
        mgr.generate_key_pair("k1", "Ed25519").await.unwrap();
        mgr.set_key_status(&KeyId::new("k1"), KeyStatus::Revoked)
            .await
            .unwrap();
        mgr.generate_key_pair("k1", "Ed25519").await.unwrap();
    }

    #[tokio::test]
    async fn public_key_set_lists_only_active_keys() {
        let mgr = manager();
        mgr.generate_key_pair("default", "Ed25519").await.unwrap();
        mgr.generate_key_pair("retired", "Ed25519").await.unwrap();
        mgr.set_key_status(&KeyId::new("retired"), KeyStatus::Inactive)
            .await
            .unwrap();

        let set = mgr.get_public_key_set().await.unwrap();
        assert_eq!(set.keys.len(), 1);
        assert_eq!(set.keys[0].kid, "default");
    }

    #[tokio::test]
    async fn status_transition_cannot_reverse() {
        let mgr = manager();
        mgr.generate_key_pair("k1", "Ed25519").await.unwrap();
        let id = KeyId::new("k1");
        mgr.set_key_status(&id, KeyStatus::Inactive).await.unwrap();
        let err = mgr.set_key_status(&id, KeyStatus::Active).await.unwrap_err();
        assert!(matches!(err, KeyError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn resolve_none_yields_default() {
        let mgr = manager();
        mgr.generate_key_pair("default", "Ed25519").await.unwrap();
        let key = mgr.resolve_key(None, KeyUsage::Signing).await.unwrap();
        assert_eq!(key.id().as_str(), "default");
    }

    #[tokio::test]
    async fn resolve_explicit_fragment_yields_named_key() {
        let mgr = manager();
        mgr.generate_key_pair("default", "Ed25519").await.unwrap();
        mgr.generate_key_pair("special", "Ed25519").await.unwrap();
        let key = mgr
            .resolve_key(
                Some("https://issuer.example.org/keys#special"),
                KeyUsage::Signing,
            )
            .await
            .unwrap();
        assert_eq!(key.id().as_str(), "special");
    }

    #[tokio::test]
    async fn resolve_malformed_reference_falls_back_to_default() {
        let mgr = manager();
        mgr.generate_key_pair("default", "Ed25519").await.unwrap();
        let key = mgr
            .resolve_key(Some("not a url at all"), KeyUsage::Signing)
            .await
            .unwrap();
        assert_eq!(key.id().as_str(), "default");
    }

    #[tokio::test]
    async fn resolve_explicit_unknown_key_fails() {
        let mgr = manager();
        mgr.generate_key_pair("default", "Ed25519").await.unwrap();
        let err = mgr
            .resolve_key(
                Some("https://issuer.example.org/keys#ghost"),
                KeyUsage::Signing,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, KeyError::NotFound(_)));
    }

    #[tokio::test]
    async fn resolve_for_signing_rejects_revoked_key() {
        let mgr = manager();
        mgr.generate_key_pair("default", "Ed25519").await.unwrap();
        mgr.generate_key_pair("old", "Ed25519").await.unwrap();
        mgr.set_key_status(&KeyId::new("old"), KeyStatus::Revoked)
            .await
            .unwrap();

        let err = mgr
            .resolve_key(Some("https://issuer.example.org/keys#old"), KeyUsage::Signing)
            .await
            .unwrap_err();
        assert!(matches!(err, KeyError::NotFound(_)));
    }

    #[tokio::test]
    async fn resolve_for_verification_accepts_revoked_key() {
        let mgr = manager();
        mgr.generate_key_pair("default", "Ed25519").await.unwrap();
        mgr.generate_key_pair("old", "Ed25519").await.unwrap();
        mgr.set_key_status(&KeyId::new("old"), KeyStatus::Revoked)
            .await
            .unwrap();

        let key = mgr
            .resolve_key(
                Some("https://issuer.example.org/keys#old"),
                KeyUsage::Verification,
            )
            .await
            .unwrap();
        assert_eq!(key.id().as_str(), "old");
    }

    #[tokio::test]
    async fn verification_method_carries_fragment() {
        let mgr = manager();
        let vm = mgr.verification_method(&KeyId::new("k1"));
        assert_eq!(vm, "https://issuer.example.org/keys#k1");
    }
}
