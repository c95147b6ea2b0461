//! # Resolver
//!
//! Owns the ordered registry list (bootstrap first), the schema cache and
//! the structural validator, and orchestrates lookups:
//!
//! 1. A live cache entry for the key's canonical path is returned without
//!    consulting any registry. An expired entry is evicted.
//! 2. On a miss, registries are consulted one at a time in
//!    [`resolution_order`]. The first schema returned wins; later registries
//!    are never contacted.
//! 3. Not-found and lookup-failure outcomes are recorded and the search
//!    continues. If every registry is exhausted the caller receives a
//!    [`ResolverError`] listing all outcomes in order.
//! 4. A found schema is stored in the cache. Misses are never cached.
//!
//! Concurrent lookups of the same missing key may each consult the
//! registries; the last one to finish overwrites the cache entry.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use iglu_core::{SchemaKey, SelfDescribingJson};
use iglu_schema::{SchemaValidationError, StructuralValidator};
use serde_json::Value;

use crate::bootstrap::bootstrap_source;
use crate::cache::SchemaCache;
use crate::error::{ClientError, ResolverError, SourceOutcome};
use crate::registry::{resolution_order, SchemaSource};

#[derive(Debug)]
pub struct Resolver {
    sources: Vec<Arc<SchemaSource>>,
    cache: SchemaCache,
    validator: StructuralValidator,
}

impl Resolver {
    /// Resolver over `sources` with an unbounded cache and optional TTL.
    ///
    /// The bootstrap repository is prepended to `sources`.
    pub fn new(sources: Vec<SchemaSource>, cache_ttl: Option<Duration>) -> Self {
        Self::with_cache(sources, SchemaCache::new(cache_ttl))
    }

    /// Resolver over `sources` using a preconfigured cache.
    pub fn with_cache(sources: Vec<SchemaSource>, cache: SchemaCache) -> Self {
        let mut all = Vec::with_capacity(sources.len() + 1);
        all.push(bootstrap_source());
        all.extend(sources.into_iter().map(Arc::new));

        tracing::info!(
            registries = all.len(),
            cache_ttl_secs = cache.ttl().map(|t| t.as_secs()),
            cache_size = cache.capacity(),
            "resolver constructed"
        );

        Self {
            sources: all,
            cache,
            validator: StructuralValidator::default(),
        }
    }

    /// All registries, bootstrap first, in configured order.
    pub fn sources(&self) -> &[Arc<SchemaSource>] {
        &self.sources
    }

    /// Registries in the order they would be consulted for `key`.
    pub fn resolution_order(&self, key: &SchemaKey) -> Vec<&SchemaSource> {
        resolution_order(key, &self.sources)
            .into_iter()
            .map(Arc::as_ref)
            .collect()
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Resolve the schema document for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError`] carrying one outcome per consulted registry
    /// when none of them returns the schema.
    pub async fn lookup_schema(&self, key: &SchemaKey) -> Result<Value, ResolverError> {
        let path = key.canonical_path();

        if let Some(schema) = self.cache.get(&path, Utc::now()) {
            tracing::debug!(%key, "schema cache hit");
            return Ok(schema);
        }

        let mut outcomes = Vec::new();
        for source in resolution_order(key, &self.sources) {
            match source.lookup(key).await {
                Ok(Some(schema)) => {
                    tracing::debug!(%key, registry = source.name(), "schema resolved");
                    self.cache.insert(path, schema.clone(), Utc::now());
                    return Ok(schema);
                }
                Ok(None) => {
                    tracing::debug!(%key, registry = source.name(), "schema not found");
                    outcomes.push(SourceOutcome::NotFound {
                        registry: source.name().to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        %key,
                        registry = source.name(),
                        error = %e.reason,
                        "registry lookup failed"
                    );
                    outcomes.push(e.into());
                }
            }
        }

        Err(ResolverError {
            key: key.clone(),
            outcomes,
        })
    }

    /// Parse `key` and resolve its schema.
    pub async fn lookup_schema_str(&self, key: &str) -> Result<Value, ClientError> {
        let key = SchemaKey::parse(key)?;
        Ok(self.lookup_schema(&key).await?)
    }

    /// Validate a self-describing envelope against its resolved schema.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Iglu`] if the envelope lacks `schema` or `data`, or
    ///   its key is malformed.
    /// - [`ClientError::Resolver`] if the schema cannot be resolved.
    /// - [`ClientError::SchemaViolation`] if the data does not conform.
    pub async fn validate(&self, envelope: &Value) -> Result<(), ClientError> {
        let instance = SelfDescribingJson::parse(envelope)?;
        self.validate_instance(&instance).await
    }

    pub async fn validate_instance(
        &self,
        instance: &SelfDescribingJson,
    ) -> Result<(), ClientError> {
        let key = &instance.schema;
        let schema = self.lookup_schema(key).await?;
        self.validator
            .validate(key, &schema, &instance.data)
            .map_err(|e| match e {
                SchemaValidationError::ValidationFailed(violations) => {
                    ClientError::SchemaViolation(violations)
                }
                SchemaValidationError::UncompilableSchema { key, reason } => {
                    ClientError::InvalidSchema { key, reason }
                }
            })
    }

    /// True iff `envelope` validates; every failure collapses to `false`.
    pub async fn is_valid(&self, envelope: &Value) -> bool {
        match self.validate(envelope).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "instance is not valid");
                false
            }
        }
    }
}
