//! # Resolver Configuration
//!
//! A resolver is configured by a self-describing document:
//!
//! ```json
//! {
//!   "schema": "iglu:com.snowplowanalytics.iglu/resolver-config/jsonschema/1-0-2",
//!   "data": {
//!     "cacheSize": 500,
//!     "cacheTtl": 600,
//!     "repositories": [
//!       {
//!         "name": "Acme Registry",
//!         "priority": 1,
//!         "vendorPrefixes": ["com.acme"],
//!         "connection": { "http": { "uri": "https://iglu.acme.test" } }
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! The configuration schema is read from the bootstrap repository before
//! any other registry is known, and `data` must validate against it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use iglu_core::SelfDescribingJson;
use iglu_schema::StructuralValidator;
use serde::Deserialize;
use serde_json::Value;

use crate::bootstrap::lookup_bootstrap;
use crate::cache::SchemaCache;
use crate::embedded::EmbeddedSource;
use crate::error::ConfigError;
use crate::http::HttpSource;
use crate::registry::{SchemaSource, SourceDescriptor};
use crate::resolver::Resolver;

/// Vendor of the resolver configuration schemas.
pub const RESOLVER_CONFIG_VENDOR: &str = "com.snowplowanalytics.iglu";

/// Name of the resolver configuration schemas.
pub const RESOLVER_CONFIG_NAME: &str = "resolver-config";

/// `data` of a resolver configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Maximum number of cached schemas; `0` or absent means unbounded.
    #[serde(default)]
    pub cache_size: Option<usize>,
    /// Cache time-to-live in seconds; absent means entries never expire.
    #[serde(default)]
    pub cache_ttl: Option<u64>,
    pub repositories: Vec<RepositoryConfig>,
}

/// One configured registry.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    #[serde(flatten)]
    pub descriptor: SourceDescriptor,
    pub connection: ConnectionConfig,
}

/// Connection variants. Exactly one is expected to be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub http: Option<HttpConnection>,
    #[serde(default)]
    pub embedded: Option<EmbeddedConnection>,
}

/// Custom `Debug` implementation redacts the `apikey` field.
#[derive(Clone, Deserialize)]
pub struct HttpConnection {
    pub uri: String,
    #[serde(default)]
    pub apikey: Option<String>,
}

impl std::fmt::Debug for HttpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnection")
            .field("uri", &self.uri)
            .field("apikey", &self.apikey.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedConnection {
    pub path: PathBuf,
}

impl ResolverConfig {
    /// Validate and decode a configuration envelope.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Envelope` if `json` is not self-describing.
    /// - `ConfigError::UnknownConfigSchema` if the key is not a resolver
    ///   configuration schema shipped in the bootstrap repository.
    /// - `ConfigError::InvalidResolverConfig` if `data` fails validation.
    /// - `ConfigError::Malformed` if validated data fails to decode.
    pub fn parse(json: &Value) -> Result<Self, ConfigError> {
        let envelope = SelfDescribingJson::parse(json)?;
        let key = &envelope.schema;
        if key.vendor() != RESOLVER_CONFIG_VENDOR || key.name() != RESOLVER_CONFIG_NAME {
            return Err(ConfigError::UnknownConfigSchema { key: key.clone() });
        }

        let schema = lookup_bootstrap(key)?
            .ok_or_else(|| ConfigError::UnknownConfigSchema { key: key.clone() })?;
        StructuralValidator::default().validate(key, &schema, &envelope.data)?;

        serde_json::from_value(envelope.data).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Read and decode a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let json: Value = serde_json::from_str(&content).map_err(|e| {
            ConfigError::Malformed(format!("{} is not valid JSON: {e}", path.display()))
        })?;
        Self::parse(&json)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl.map(Duration::from_secs)
    }

    /// Build every configured registry.
    ///
    /// Relative embedded paths are resolved against `base_dir` when given.
    pub fn sources(&self, base_dir: Option<&Path>) -> Result<Vec<SchemaSource>, ConfigError> {
        self.repositories
            .iter()
            .map(|repo| repo.to_source(base_dir))
            .collect()
    }
}

impl RepositoryConfig {
    /// Build the registry this entry describes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnsupportedSourceKind` when the connection has
    /// neither an `http` nor an `embedded` variant.
    pub fn to_source(&self, base_dir: Option<&Path>) -> Result<SchemaSource, ConfigError> {
        let descriptor = self.descriptor.clone();
        if let Some(http) = &self.connection.http {
            let mut source = HttpSource::new(descriptor, &http.uri)?;
            if let Some(apikey) = &http.apikey {
                source = source.with_api_key(apikey.clone());
            }
            return Ok(source.into());
        }
        if let Some(embedded) = &self.connection.embedded {
            let root = match base_dir {
                Some(base) if embedded.path.is_relative() => base.join(&embedded.path),
                _ => embedded.path.clone(),
            };
            return Ok(EmbeddedSource::new(descriptor, root).into());
        }
        Err(ConfigError::UnsupportedSourceKind {
            name: self.descriptor.name.clone(),
        })
    }
}

impl Resolver {
    /// Build a resolver from decoded configuration.
    pub fn from_config(
        config: &ResolverConfig,
        base_dir: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let sources = config.sources(base_dir)?;
        let cache = SchemaCache::new(config.cache_ttl())
            .with_capacity(config.cache_size.unwrap_or(0));
        Ok(Self::with_cache(sources, cache))
    }

    /// Build a resolver from a configuration envelope.
    pub fn parse(json: &Value) -> Result<Self, ConfigError> {
        let config = ResolverConfig::parse(json)?;
        Self::from_config(&config, None)
    }

    /// Build a resolver from a configuration file. Relative embedded paths
    /// are resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = ResolverConfig::from_file(path)?;
        Self::from_config(&config, path.parent())
    }
}

/// Key of the newest resolver configuration schema shipped in the bootstrap
/// repository.
pub const LATEST_CONFIG_SCHEMA: &str =
    "iglu:com.snowplowanalytics.iglu/resolver-config/jsonschema/1-0-2";
