//! Resolver and registry error types.
//!
//! Per-source outcomes are plain values collected by the resolver. Only
//! [`ResolverError`] (every source exhausted), parse-level errors, schema
//! violations and configuration errors reach the caller.

use std::fmt;
use std::path::PathBuf;

use iglu_core::{IgluError, SchemaKey};
use iglu_schema::{SchemaValidationError, Violations};
use thiserror::Error;

/// A single registry could not be consulted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("lookup in {registry} failed: {reason}")]
pub struct LookupError {
    /// Name of the registry, from its descriptor.
    pub registry: String,
    /// Underlying cause rendered as text.
    pub reason: String,
}

impl LookupError {
    pub fn new(registry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome recorded for a registry that did not return a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The registry answered but holds no such schema.
    NotFound {
        registry: String,
    },
    /// The registry could not be consulted.
    LookupFailure {
        registry: String,
        reason: String,
    },
}

impl SourceOutcome {
    pub fn registry(&self) -> &str {
        match self {
            Self::NotFound { registry } | Self::LookupFailure { registry, .. } => registry,
        }
    }
}

impl From<LookupError> for SourceOutcome {
    fn from(e: LookupError) -> Self {
        Self::LookupFailure {
            registry: e.registry,
            reason: e.reason,
        }
    }
}

impl fmt::Display for SourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { registry } => write!(f, "Not found in {registry}"),
            Self::LookupFailure { registry, reason } => {
                write!(f, "Lookup failure at {registry} because {reason}")
            }
        }
    }
}

/// Every registry was consulted and none returned the schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("schema {key} could not be resolved: [{}]", join_outcomes(.outcomes))]
pub struct ResolverError {
    pub key: SchemaKey,
    /// One entry per consulted registry, in resolution order.
    pub outcomes: Vec<SourceOutcome>,
}

fn join_outcomes(outcomes: &[SourceOutcome]) -> String {
    outcomes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised while building a resolver from configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A repository `connection` names no recognised variant.
    #[error("unsupported source kind for repository '{name}': expected an http or embedded connection")]
    UnsupportedSourceKind { name: String },

    /// The configuration envelope names a schema the bootstrap repository
    /// does not ship.
    #[error("unknown resolver configuration schema {key}")]
    UnknownConfigSchema { key: SchemaKey },

    /// The bootstrap repository could not be read.
    #[error("bootstrap repository unavailable: {0}")]
    Bootstrap(#[from] LookupError),

    /// The configuration data did not validate against its schema.
    #[error("invalid resolver configuration: {0}")]
    InvalidResolverConfig(#[from] SchemaValidationError),

    /// The configuration is not a self-describing envelope.
    #[error("resolver configuration envelope: {0}")]
    Envelope(#[from] IgluError),

    /// A registry URI failed to parse.
    #[error("invalid URI {uri:?} for repository '{name}': {reason}")]
    InvalidUri {
        name: String,
        uri: String,
        reason: String,
    },

    /// The HTTP client for a registry could not be built.
    #[error("HTTP client for repository '{name}': {reason}")]
    HttpClient { name: String, reason: String },

    /// Validated data still failed to deserialize.
    #[error("malformed resolver configuration: {0}")]
    Malformed(String),

    /// Reading the configuration file failed.
    #[error("reading resolver configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Top-level error for resolver operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The schema key or envelope could not be parsed.
    #[error(transparent)]
    Iglu(#[from] IgluError),

    /// No registry returned the schema.
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// The data does not conform to its resolved schema.
    #[error("instance violates its schema: {0}")]
    SchemaViolation(Violations),

    /// The resolved schema document is not a valid JSON Schema.
    #[error("schema {key} could not be compiled: {reason}")]
    InvalidSchema { key: SchemaKey, reason: String },
}
