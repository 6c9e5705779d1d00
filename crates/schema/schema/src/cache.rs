//! TTL-based cache of compiled validators.
//!
//! One entry per subject. Hits are O(1) and make no network call; a miss or
//! an expired entry fetches the latest schema from the registry, compiles
//! it, and atomically replaces the prior entry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::SchemaResult;
use crate::registry::SchemaRegistry;
use crate::validator::CompiledSchema;

struct CachedEntry {
    validator: Arc<CompiledSchema>,
    expires_at: Instant,
}

/// Cache of compiled validators, keyed by subject.
///
/// The TTL is a single configured value shared by all subjects. Concurrent
/// resolves of the same expired subject may each fetch from the registry;
/// fetches are idempotent and the last write wins.
pub struct SchemaCache {
    registry: Arc<dyn SchemaRegistry>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedEntry>>,
}

impl SchemaCache {
    /// Creates a cache over a registry with the given entry TTL.
    pub fn new(registry: Arc<dyn SchemaRegistry>, ttl: Duration) -> Self {
        Self {
            registry,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Resolves the validator for a subject.
    ///
    /// Returns the cached validator when the entry is still live; otherwise
    /// fetches the latest schema definition, compiles it, and stores the
    /// result with a fresh expiry. A fetch or compile failure leaves any
    /// prior entry untouched.
    pub async fn resolve(&self, subject: &str) -> SchemaResult<Arc<CompiledSchema>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(subject) {
                if entry.expires_at > Instant::now() {
                    return Ok(entry.validator.clone());
                }
            }
        }

        tracing::info!(subject, "loading schema from registry");

        let schema = self.registry.fetch_latest(subject).await?;
        let validator = Arc::new(CompiledSchema::compile(subject, &schema)?);

        let mut entries = self.entries.write().await;
        entries.insert(
            subject.to_string(),
            CachedEntry {
                validator: validator.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );

        Ok(validator)
    }

    /// Drops the cached entry for a subject, forcing a refetch on the next
    /// resolve.
    pub async fn evict(&self, subject: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(subject).is_some()
    }

    /// Number of cached subjects, live or expired.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    /// True when no subject is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::registry::StaticSchemaRegistry;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Registry wrapper that counts fetches.
    struct CountingRegistry {
        inner: StaticSchemaRegistry,
        fetches: AtomicUsize,
    }

    impl CountingRegistry {
        fn new() -> Self {
            Self {
                inner: StaticSchemaRegistry::new(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SchemaRegistry for CountingRegistry {
        async fn fetch_latest(&self, subject: &str) -> SchemaResult<Value> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_latest(subject).await
        }
    }

    fn orders_schema() -> Value {
        json!({
            "type": "object",
            "required": ["eventId", "amount"],
            "properties": {
                "eventId": {"type": "string"},
                "amount": {"type": "number"}
            }
        })
    }

    #[tokio::test]
    async fn test_second_resolve_within_ttl_hits_cache() {
        let registry = Arc::new(CountingRegistry::new());
        registry.inner.register("orders", orders_schema()).await;

        let cache = SchemaCache::new(registry.clone(), Duration::from_secs(300));

        cache.resolve("orders").await.unwrap();
        cache.resolve("orders").await.unwrap();

        assert_eq!(registry.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let registry = Arc::new(CountingRegistry::new());
        registry.inner.register("orders", orders_schema()).await;

        // Zero TTL: every entry is expired by the next resolve.
        let cache = SchemaCache::new(registry.clone(), Duration::ZERO);

        let first = cache.resolve("orders").await.unwrap();
        let second = cache.resolve("orders").await.unwrap();

        assert_eq!(registry.fetch_count(), 2);

        // Unchanged upstream schema: the fresh validator behaves the same.
        let payload = json!({"eventId": "e1", "amount": 10});
        assert_eq!(
            first.validate(&payload).is_valid(),
            second.validate(&payload).is_valid()
        );
    }

    #[tokio::test]
    async fn test_missing_subject_is_not_cached() {
        let registry = Arc::new(CountingRegistry::new());
        let cache = SchemaCache::new(registry.clone(), Duration::from_secs(300));

        let err = cache.resolve("ghost").await.unwrap_err();
        assert!(matches!(err, SchemaError::SchemaNotFound(_)));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_compile_failure_leaves_prior_entry() {
        let registry = Arc::new(CountingRegistry::new());
        registry.inner.register("orders", orders_schema()).await;

        let cache = SchemaCache::new(registry.clone(), Duration::ZERO);
        cache.resolve("orders").await.unwrap();

        // Upstream replaces the schema with a malformed document.
        registry.inner.register("orders", json!({"type": 12})).await;

        let err = cache.resolve("orders").await.unwrap_err();
        assert!(matches!(err, SchemaError::SchemaCompileError { .. }));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_evict_forces_refetch() {
        let registry = Arc::new(CountingRegistry::new());
        registry.inner.register("orders", orders_schema()).await;

        let cache = SchemaCache::new(registry.clone(), Duration::from_secs(300));
        cache.resolve("orders").await.unwrap();

        assert!(cache.evict("orders").await);
        cache.resolve("orders").await.unwrap();

        assert_eq!(registry.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_subjects_are_cached_independently() {
        let registry = Arc::new(CountingRegistry::new());
        registry.inner.register("orders", orders_schema()).await;
        registry
            .inner
            .register("payments", json!({"type": "object"}))
            .await;

        let cache = SchemaCache::new(registry.clone(), Duration::from_secs(300));

        cache.resolve("orders").await.unwrap();
        cache.resolve("payments").await.unwrap();
        cache.resolve("orders").await.unwrap();

        assert_eq!(registry.fetch_count(), 2);
        assert_eq!(cache.len().await, 2);
    }
}
