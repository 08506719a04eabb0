//! # Schema Fetch Collaborator
//!
//! [`SchemaFetcher`] is the network seam: the validator depends on this
//! trait, and [`HttpSchemaFetcher`] is the reqwest-backed production
//! implementation. Tests substitute in-memory fetchers or wiremock
//! servers.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::SchemaError;

/// HTTP GET collaborator for schema documents.
#[async_trait]
pub trait SchemaFetcher: Send + Sync {
    /// Fetch and parse the schema document at `url`.
    ///
    /// Non-2xx responses yield [`SchemaError::Fetch`] with the status;
    /// transport failures yield the same variant without one. The
    /// overall deadline is enforced by the caller, which drops this
    /// future on timeout.
    async fn fetch(&self, url: &Url) -> Result<Value, SchemaError>;
}

/// Production fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpSchemaFetcher {
    http: reqwest::Client,
}

impl HttpSchemaFetcher {
    /// Create a fetcher with a default client.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Create a fetcher over a preconfigured client (proxies, TLS,
    /// connection pools).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for HttpSchemaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaFetcher for HttpSchemaFetcher {
    async fn fetch(&self, url: &Url) -> Result<Value, SchemaError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SchemaError::Fetch {
                url: url.to_string(),
                status: None,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = status.as_u16(), "schema fetch rejected");
            return Err(SchemaError::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: format!("status {status}: {body}"),
            });
        }

        response.json::<Value>().await.map_err(|e| SchemaError::InvalidSchema {
            url: url.to_string(),
            reason: format!("response is not JSON: {e}"),
        })
    }
}
