//! Schema registry clients.
//!
//! A registry resolves a subject name to its latest schema document. The
//! gateway always asks for "latest" and never pins a version.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
#[cfg(feature = "http-client")]
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::{SchemaError, SchemaResult};

/// Trait for schema registry backends.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Fetches the latest schema document registered for a subject.
    async fn fetch_latest(&self, subject: &str) -> SchemaResult<Value>;
}

/// HTTP schema registry client.
///
/// Talks to a registry service exposing
/// `GET {base_url}/subjects/{subject}/latest`, which returns the schema
/// document as a JSON body. A 404 means the subject has no schema.
#[cfg(feature = "http-client")]
pub struct HttpSchemaRegistry {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[cfg(feature = "http-client")]
impl HttpSchemaRegistry {
    /// Creates a client for the registry at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn subject_url(&self, subject: &str) -> String {
        format!("{}/subjects/{}/latest", self.base_url, subject)
    }
}

#[cfg(feature = "http-client")]
#[async_trait]
impl SchemaRegistry for HttpSchemaRegistry {
    async fn fetch_latest(&self, subject: &str) -> SchemaResult<Value> {
        let response = self
            .client
            .get(self.subject_url(subject))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SchemaError::SchemaNotFound(subject.to_string()));
        }

        if !status.is_success() {
            return Err(SchemaError::RegistryUnavailable(format!(
                "registry returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SchemaError::InvalidDocument {
                subject: subject.to_string(),
                reason: e.to_string(),
            })
    }
}

/// In-memory registry backed by a subject map.
///
/// Useful for tests and local development. Data is lost when the process
/// exits.
pub struct StaticSchemaRegistry {
    schemas: RwLock<HashMap<String, Value>>,
}

impl StaticSchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// Registers (or replaces) the schema document for a subject.
    pub async fn register(&self, subject: impl Into<String>, schema: Value) {
        let mut schemas = self.schemas.write().await;
        schemas.insert(subject.into(), schema);
    }

    /// Removes the schema for a subject.
    pub async fn unregister(&self, subject: &str) -> Option<Value> {
        let mut schemas = self.schemas.write().await;
        schemas.remove(subject)
    }
}

impl Default for StaticSchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaRegistry for StaticSchemaRegistry {
    async fn fetch_latest(&self, subject: &str) -> SchemaResult<Value> {
        let schemas = self.schemas.read().await;
        schemas
            .get(subject)
            .cloned()
            .ok_or_else(|| SchemaError::SchemaNotFound(subject.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_registry_fetch() {
        let registry = StaticSchemaRegistry::new();
        registry
            .register("orders", json!({"type": "object"}))
            .await;

        let schema = registry.fetch_latest("orders").await.unwrap();
        assert_eq!(schema, json!({"type": "object"}));
    }

    #[tokio::test]
    async fn test_static_registry_missing_subject() {
        let registry = StaticSchemaRegistry::new();

        let err = registry.fetch_latest("missing").await.unwrap_err();
        assert!(matches!(err, SchemaError::SchemaNotFound(s) if s == "missing"));
    }

    #[tokio::test]
    async fn test_static_registry_unregister() {
        let registry = StaticSchemaRegistry::new();
        registry.register("orders", json!({"type": "object"})).await;

        assert!(registry.unregister("orders").await.is_some());
        assert!(registry.fetch_latest("orders").await.is_err());
    }

    #[tokio::test]
    async fn test_static_registry_replaces_on_register() {
        let registry = StaticSchemaRegistry::new();
        registry.register("orders", json!({"type": "object"})).await;
        registry
            .register("orders", json!({"type": "object", "required": ["id"]}))
            .await;

        let schema = registry.fetch_latest("orders").await.unwrap();
        assert_eq!(schema["required"], json!(["id"]));
    }
}
