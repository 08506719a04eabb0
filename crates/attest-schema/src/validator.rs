//! # Schema Validator
//!
//! The validation pipeline: allow-list check, fetch under timeout,
//! optional strict meta-validation, cached compilation, violation
//! aggregation, then custom rules.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use attest_core::Clock;

use crate::cache::{BoundedCache, CacheConfig};
use crate::error::{RuleViolations, SchemaError, ValidationViolations, Violation};
use crate::fetch::SchemaFetcher;
use crate::rules::{CustomRule, RuleContext};

/// The fixed allow-list of schema validator types.
///
/// A reference declaring anything else is rejected before any network
/// traffic happens.
pub const SUPPORTED_SCHEMA_TYPES: [&str; 2] =
    ["1EdTechJsonSchemaValidator2019", "JsonSchemaValidator2018"];

/// A credential's reference to an external schema, matching the wire
/// shape of `credentialSchema` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    /// URL of the schema document.
    pub id: String,
    /// Declared validator type; must sit in [`SUPPORTED_SCHEMA_TYPES`].
    #[serde(rename = "type")]
    pub schema_type: String,
}

impl SchemaRef {
    /// Build a reference from its two wire fields.
    pub fn new(id: impl Into<String>, schema_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            schema_type: schema_type.into(),
        }
    }
}

/// Per-call validation options.
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions {
    /// Deadline for each schema fetch; the in-flight request is
    /// abandoned when it elapses.
    pub timeout: Duration,
    /// Meta-validate fetched documents before compiling them.
    pub strict: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            strict: false,
        }
    }
}

/// Validates credentials against remote schemas and semantic rules.
///
/// Holds two independent bounded caches: raw schema documents and
/// compiled validators, both keyed by schema URL.
pub struct SchemaValidator {
    fetcher: Arc<dyn SchemaFetcher>,
    clock: Arc<dyn Clock>,
    raw_cache: BoundedCache<Value>,
    compiled_cache: BoundedCache<Arc<jsonschema::Validator>>,
    rules: Vec<Box<dyn CustomRule>>,
}

impl SchemaValidator {
    /// Create a validator with no custom rules.
    pub fn new(fetcher: Arc<dyn SchemaFetcher>, clock: Arc<dyn Clock>, cache: CacheConfig) -> Self {
        Self {
            fetcher,
            clock,
            raw_cache: BoundedCache::new(cache),
            compiled_cache: BoundedCache::new(cache),
            rules: Vec::new(),
        }
    }

    /// Add the three built-in reference rules (issuance date present and
    /// not in the future, expiration not in the past, issuer a valid
    /// URL).
    pub fn with_reference_rules(self) -> Self {
        self.with_rule(Box::new(crate::rules::IssuanceDatePresentRule))
            .with_rule(Box::new(crate::rules::ExpirationNotPastRule))
            .with_rule(Box::new(crate::rules::IssuerUrlRule))
    }

    /// Append a custom rule. Rules run in insertion order.
    pub fn with_rule(mut self, rule: Box<dyn CustomRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Validate a credential against each schema reference, then run
    /// every custom rule.
    ///
    /// Schema violations aggregate across all references into
    /// [`SchemaError::CredentialValidation`]. Custom rules run
    /// unconditionally after schema validation; when only rules fail,
    /// the error is [`SchemaError::Rules`] listing every collected
    /// message. Operational failures (unsupported type, fetch, timeout,
    /// invalid schema) abort immediately.
    pub async fn validate_credential(
        &self,
        credential: &Value,
        schema_refs: &[SchemaRef],
        options: &ValidationOptions,
    ) -> Result<(), SchemaError> {
        let mut violations = Vec::new();

        for schema_ref in schema_refs {
            if !SUPPORTED_SCHEMA_TYPES.contains(&schema_ref.schema_type.as_str()) {
                return Err(SchemaError::UnsupportedSchemaType {
                    url: schema_ref.id.clone(),
                    schema_type: schema_ref.schema_type.clone(),
                });
            }

            let raw = self.raw_schema(&schema_ref.id, options).await?;

            if options.strict {
                jsonschema::meta::validate(&raw).map_err(|e| SchemaError::InvalidSchema {
                    url: schema_ref.id.clone(),
                    reason: e.to_string(),
                })?;
            }

            let validator = self.compiled(&schema_ref.id, &raw)?;
            for error in validator.iter_errors(credential) {
                violations.push(Violation {
                    schema_url: schema_ref.id.clone(),
                    instance_path: error.instance_path.to_string(),
                    message: error.to_string(),
                });
            }
        }

        // Custom rules run unconditionally after schema validation.
        let ctx = RuleContext {
            now: self.clock.now(),
        };
        let mut rule_messages = Vec::new();
        for rule in &self.rules {
            let outcome = rule.evaluate(credential, &ctx);
            if !outcome.is_valid {
                tracing::debug!(rule = rule.name(), "custom rule rejected credential");
                rule_messages.extend(outcome.errors);
            }
        }

        if !violations.is_empty() {
            return Err(SchemaError::CredentialValidation {
                violations: ValidationViolations::new(violations),
            });
        }
        if !rule_messages.is_empty() {
            return Err(SchemaError::Rules(RuleViolations(rule_messages)));
        }
        Ok(())
    }

    /// Drop both caches explicitly.
    pub fn clear_caches(&self) {
        self.raw_cache.clear();
        self.compiled_cache.clear();
    }

    async fn raw_schema(
        &self,
        url_str: &str,
        options: &ValidationOptions,
    ) -> Result<Value, SchemaError> {
        if let Some(cached) = self.raw_cache.get(url_str) {
            return Ok(cached);
        }

        let url = Url::parse(url_str).map_err(|e| SchemaError::Fetch {
            url: url_str.to_string(),
            status: None,
            reason: format!("invalid schema URL: {e}"),
        })?;

        let fetched = match tokio::time::timeout(options.timeout, self.fetcher.fetch(&url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SchemaError::Timeout {
                    url: url_str.to_string(),
                    timeout_ms: options.timeout.as_millis() as u64,
                })
            }
        };

        self.raw_cache.insert(url_str.to_string(), fetched.clone());
        Ok(fetched)
    }

    fn compiled(&self, url: &str, raw: &Value) -> Result<Arc<jsonschema::Validator>, SchemaError> {
        if let Some(cached) = self.compiled_cache.get(url) {
            return Ok(cached);
        }
        let validator =
            jsonschema::options()
                .build(raw)
                .map_err(|e| SchemaError::InvalidSchema {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
        let validator = Arc::new(validator);
        self.compiled_cache.insert(url.to_string(), validator.clone());
        Ok(validator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::{FixedClock, Timestamp};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MapFetcher {
        schemas: HashMap<String, Value>,
        calls: AtomicUsize,
    }

    impl MapFetcher {
        fn new(schemas: HashMap<String, Value>) -> Self {
            Self {
                schemas,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl SchemaFetcher for MapFetcher {
        async fn fetch(&self, url: &Url) -> Result<Value, SchemaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.schemas
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| SchemaError::Fetch {
                    url: url.to_string(),
                    status: Some(404),
                    reason: "status 404".to_string(),
                })
        }
    }

    const SCHEMA_URL: &str = "https://schemas.example.org/achievement.json";

    fn achievement_schema() -> Value {
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "required": ["id", "credentialSubject"],
            "properties": {
                "id": {"type": "string"},
                "credentialSubject": {
                    "type": "object",
                    "required": ["achievement"]
                }
            }
        })
    }

    fn valid_credential() -> Value {
        json!({
            "id": "urn:uuid:c1",
            "issuer": "https://issuer.example.org",
            "issuanceDate": "2026-01-01T00:00:00Z",
            "credentialSubject": {"achievement": "rust-basics"}
        })
    }

    fn validator_over(fetcher: Arc<MapFetcher>) -> SchemaValidator {
        let clock = FixedClock(Timestamp::parse("2026-01-15T12:00:00Z").unwrap());
        SchemaValidator::new(fetcher, Arc::new(clock), CacheConfig::default())
    }

    fn refs() -> Vec<SchemaRef> {
        vec![SchemaRef::new(SCHEMA_URL, "1EdTechJsonSchemaValidator2019")]
    }

    #[test]
    fn schema_ref_parses_credential_schema_wire_shape() {
        let member = json!({
            "id": SCHEMA_URL,
            "type": "1EdTechJsonSchemaValidator2019"
        });
        let parsed: SchemaRef = serde_json::from_value(member).unwrap();
        assert_eq!(parsed, SchemaRef::new(SCHEMA_URL, "1EdTechJsonSchemaValidator2019"));
    }

    #[tokio::test]
    async fn valid_credential_passes() {
        let fetcher = Arc::new(MapFetcher::new(HashMap::from([(
            SCHEMA_URL.to_string(),
            achievement_schema(),
        )])));
        let validator = validator_over(fetcher);
        validator
            .validate_credential(&valid_credential(), &refs(), &ValidationOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn schema_violations_aggregate() {
        let fetcher = Arc::new(MapFetcher::new(HashMap::from([(
            SCHEMA_URL.to_string(),
            achievement_schema(),
        )])));
        let validator = validator_over(fetcher);
        let bad = json!({"credentialSubject": {}});
        let err = validator
            .validate_credential(&bad, &refs(), &ValidationOptions::default())
            .await
            .unwrap_err();
        match err {
            SchemaError::CredentialValidation { violations } => {
                // Missing "id" and missing "achievement".
                assert!(violations.len() >= 2, "got: {violations}");
            }
            other => panic!("expected CredentialValidation, got {other}"),
        }
    }

    #[tokio::test]
    async fn unsupported_schema_type_rejected_before_fetch() {
        let fetcher = Arc::new(MapFetcher::new(HashMap::new()));
        let counter = Arc::clone(&fetcher);
        let validator = validator_over(fetcher);
        let refs = vec![SchemaRef::new(SCHEMA_URL, "XmlSchemaValidator")];
        let err = validator
            .validate_credential(&valid_credential(), &refs, &ValidationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedSchemaType { .. }));
        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_validation_hits_the_cache() {
        let fetcher = Arc::new(MapFetcher::new(HashMap::from([(
            SCHEMA_URL.to_string(),
            achievement_schema(),
        )])));
        let counter = Arc::clone(&fetcher);
        let validator = validator_over(fetcher);
        for _ in 0..2 {
            validator
                .validate_credential(&valid_credential(), &refs(), &ValidationOptions::default())
                .await
                .unwrap();
        }
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clear_caches_forces_refetch() {
        let fetcher = Arc::new(MapFetcher::new(HashMap::from([(
            SCHEMA_URL.to_string(),
            achievement_schema(),
        )])));
        let counter = Arc::clone(&fetcher);
        let validator = validator_over(fetcher);
        validator
            .validate_credential(&valid_credential(), &refs(), &ValidationOptions::default())
            .await
            .unwrap();
        validator.clear_caches();
        validator
            .validate_credential(&valid_credential(), &refs(), &ValidationOptions::default())
            .await
            .unwrap();
        assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_404_carries_status() {
        let fetcher = Arc::new(MapFetcher::new(HashMap::new()));
        let validator = validator_over(fetcher);
        let err = validator
            .validate_credential(&valid_credential(), &refs(), &ValidationOptions::default())
            .await
            .unwrap_err();
        match err {
            SchemaError::Fetch { status, .. } => assert_eq!(status, Some(404)),
            other => panic!("expected Fetch, got {other}"),
        }
    }

    #[tokio::test]
    async fn strict_mode_rejects_malformed_schema() {
        let fetcher = Arc::new(MapFetcher::new(HashMap::from([(
            SCHEMA_URL.to_string(),
            json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "type": "not-a-real-type"
            }),
        )])));
        let validator = validator_over(fetcher);
        let err = validator
            .validate_credential(
                &valid_credential(),
                &refs(),
                &ValidationOptions {
                    strict: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchema { .. }), "got {err}");
    }

    #[tokio::test]
    async fn reference_rules_aggregate_messages() {
        let fetcher = Arc::new(MapFetcher::new(HashMap::from([(
            SCHEMA_URL.to_string(),
            achievement_schema(),
        )])));
        let validator = validator_over(fetcher).with_reference_rules();
        // No issuance date, no issuer — two rule failures at once.
        let bare = json!({
            "id": "urn:uuid:c1",
            "credentialSubject": {"achievement": "rust-basics"}
        });
        let err = validator
            .validate_credential(&bare, &refs(), &ValidationOptions::default())
            .await
            .unwrap_err();
        match err {
            SchemaError::Rules(violations) => {
                assert_eq!(violations.0.len(), 2, "got: {violations}");
                assert!(violations.0.iter().any(|m| m.contains("issuance date")));
                assert!(violations.0.iter().any(|m| m.contains("issuer")));
            }
            other => panic!("expected Rules, got {other}"),
        }
    }

    #[tokio::test]
    async fn schema_violations_outrank_rule_failures() {
        let fetcher = Arc::new(MapFetcher::new(HashMap::from([(
            SCHEMA_URL.to_string(),
            achievement_schema(),
        )])));
        let validator = validator_over(fetcher).with_reference_rules();
        let bad = json!({"credentialSubject": {}});
        let err = validator
            .validate_credential(&bad, &refs(), &ValidationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaError::CredentialValidation { .. }));
    }

    #[tokio::test]
    async fn rules_run_without_schema_refs() {
        let fetcher = Arc::new(MapFetcher::new(HashMap::new()));
        let validator = validator_over(fetcher).with_reference_rules();
        let err = validator
            .validate_credential(&json!({}), &[], &ValidationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaError::Rules(_)));
    }

    struct SlowFetcher;

    #[async_trait::async_trait]
    impl SchemaFetcher for SlowFetcher {
        async fn fetch(&self, _url: &Url) -> Result<Value, SchemaError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(json!({}))
        }
    }

    #[tokio::test]
    async fn slow_fetch_times_out() {
        let clock = FixedClock(Timestamp::parse("2026-01-15T12:00:00Z").unwrap());
        let validator = SchemaValidator::new(
            Arc::new(SlowFetcher),
            Arc::new(clock),
            CacheConfig::default(),
        );
        let err = validator
            .validate_credential(
                &valid_credential(),
                &refs(),
                &ValidationOptions {
                    timeout: Duration::from_millis(50),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        match err {
            SchemaError::Timeout { timeout_ms, .. } => assert_eq!(timeout_ms, 50),
            other => panic!("expected Timeout, got {other}"),
        }
    }
}
