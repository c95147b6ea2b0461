//! # Schema Registries
//!
//! A registry is a place schemas can be fetched from. The set of registry
//! kinds is closed: [`SchemaSource`] is an enum over the embedded and HTTP
//! variants, and every variant answers the same two questions:
//!
//! - `lookup(key)` returns `Ok(Some(schema))`, `Ok(None)` when the registry
//!   was reachable but holds no such schema, or `Err(LookupError)` when it
//!   could not be consulted at all.
//! - `vendor_matches(key)` reports vendor affinity, used only to break ties
//!   in the resolution order.
//!
//! ## Resolution Order
//!
//! [`resolution_order`] is a stable sort on three keys, least first:
//!
//! | Key | Order | Notes |
//! |-----|-------|-------|
//! | descriptor priority | ascending | bootstrap is 0 |
//! | class priority | ascending | embedded (1) before HTTP (100) |
//! | vendor affinity | matching first | tie-break only |
//!
//! Sources equal on all three keys keep their configured relative order.

use std::sync::Arc;

use iglu_core::SchemaKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::embedded::EmbeddedSource;
use crate::error::LookupError;
use crate::http::HttpSource;

/// Class priority of embedded registries.
pub const EMBEDDED_CLASS_PRIORITY: u32 = 1;

/// Class priority of HTTP registries.
pub const HTTP_CLASS_PRIORITY: u32 = 100;

/// Configuration shared by every registry kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDescriptor {
    /// Display name used in logs and failure reports.
    pub name: String,
    /// Lower values are consulted earlier.
    pub priority: i64,
    /// Vendor prefixes this registry prefers. Empty means no affinity.
    #[serde(default)]
    pub vendor_prefixes: Vec<String>,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, priority: i64, vendor_prefixes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            priority,
            vendor_prefixes,
        }
    }

    /// True iff any configured prefix is a string prefix of the key's vendor.
    pub fn vendor_matches(&self, key: &SchemaKey) -> bool {
        self.vendor_prefixes
            .iter()
            .any(|prefix| key.vendor().starts_with(prefix.as_str()))
    }
}

/// A registry the resolver can consult.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Schemas stored as files under a local directory.
    Embedded(EmbeddedSource),
    /// Schemas served by an HTTP registry.
    Http(HttpSource),
}

impl SchemaSource {
    pub fn descriptor(&self) -> &SourceDescriptor {
        match self {
            Self::Embedded(source) => source.descriptor(),
            Self::Http(source) => source.descriptor(),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Secondary sort key, fixed per variant.
    pub fn class_priority(&self) -> u32 {
        match self {
            Self::Embedded(_) => EMBEDDED_CLASS_PRIORITY,
            Self::Http(_) => HTTP_CLASS_PRIORITY,
        }
    }

    /// Short label of the registry kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Embedded(_) => "embedded",
            Self::Http(_) => "HTTP",
        }
    }

    pub fn vendor_matches(&self, key: &SchemaKey) -> bool {
        self.descriptor().vendor_matches(key)
    }

    /// Attempt to fetch the schema for `key` from this registry.
    pub async fn lookup(&self, key: &SchemaKey) -> Result<Option<Value>, LookupError> {
        match self {
            Self::Embedded(source) => source.lookup(key),
            Self::Http(source) => source.lookup(key).await,
        }
    }
}

impl From<EmbeddedSource> for SchemaSource {
    fn from(source: EmbeddedSource) -> Self {
        Self::Embedded(source)
    }
}

impl From<HttpSource> for SchemaSource {
    fn from(source: HttpSource) -> Self {
        Self::Http(source)
    }
}

/// Order `sources` for resolving `key`.
///
/// A pure function of its inputs: calling it twice with the same arguments
/// yields the same sequence.
pub fn resolution_order<'a>(
    key: &SchemaKey,
    sources: &'a [Arc<SchemaSource>],
) -> Vec<&'a Arc<SchemaSource>> {
    let mut ordered: Vec<&Arc<SchemaSource>> = sources.iter().collect();
    // `sort_by_key` is stable.
    ordered.sort_by_key(|source| {
        (
            source.descriptor().priority,
            source.class_priority(),
            !source.vendor_matches(key),
        )
    });
    ordered
}
