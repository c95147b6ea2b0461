//! Bootstrap repository.
//!
//! An embedded registry holding the schemas the resolver needs to validate
//! its own configuration. The documents are compiled into the binary, so an
//! installed or relocated executable resolves them without any files on
//! disk. It is constructed once per process on first use and lives for the
//! rest of the process; every [`Resolver`](crate::Resolver) shares the same
//! instance.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use iglu_core::SchemaKey;
use serde_json::Value;

use crate::embedded::{BundledSchemas, EmbeddedSource};
use crate::error::LookupError;
use crate::registry::{SchemaSource, SourceDescriptor};

/// Descriptor name of the bootstrap repository.
pub const BOOTSTRAP_NAME: &str = "Iglu Client Embedded";

/// Environment variable naming a directory that replaces the bundled
/// schemas. Read once, at first initialization.
pub const BOOTSTRAP_REPO_ENV: &str = "IGLU_BOOTSTRAP_REPO";

/// Resolver configuration schemas compiled into the binary.
pub const BUNDLED_SCHEMAS: BundledSchemas = &[
    (
        "com/snowplowanalytics/iglu/resolver-config/jsonschema/1-0-0",
        include_str!(
            "../embedded-repo/schemas/com/snowplowanalytics/iglu/resolver-config/jsonschema/1-0-0"
        ),
    ),
    (
        "com/snowplowanalytics/iglu/resolver-config/jsonschema/1-0-1",
        include_str!(
            "../embedded-repo/schemas/com/snowplowanalytics/iglu/resolver-config/jsonschema/1-0-1"
        ),
    ),
    (
        "com/snowplowanalytics/iglu/resolver-config/jsonschema/1-0-2",
        include_str!(
            "../embedded-repo/schemas/com/snowplowanalytics/iglu/resolver-config/jsonschema/1-0-2"
        ),
    ),
];

static BOOTSTRAP: OnceLock<Arc<SchemaSource>> = OnceLock::new();

/// The process-wide bootstrap registry.
///
/// Concurrent first callers race to initialize; exactly one construction is
/// kept and every caller observes it.
pub fn bootstrap_source() -> Arc<SchemaSource> {
    BOOTSTRAP
        .get_or_init(|| {
            let override_root = std::env::var_os(BOOTSTRAP_REPO_ENV).map(PathBuf::from);
            Arc::new(build_bootstrap(override_root).into())
        })
        .clone()
}

fn build_bootstrap(override_root: Option<PathBuf>) -> EmbeddedSource {
    let descriptor = SourceDescriptor::new(BOOTSTRAP_NAME, 0, Vec::new());
    match override_root {
        Some(root) => {
            tracing::info!(root = %root.display(), "bootstrap repository overridden");
            EmbeddedSource::new(descriptor, root)
        }
        None => EmbeddedSource::bundled(descriptor, BUNDLED_SCHEMAS),
    }
}

/// Read `key` from the bootstrap repository without going through a resolver.
pub(crate) fn lookup_bootstrap(key: &SchemaKey) -> Result<Option<Value>, LookupError> {
    match bootstrap_source().as_ref() {
        SchemaSource::Embedded(repo) => repo.lookup(key),
        other => Err(LookupError::new(
            other.name(),
            "bootstrap repository must be embedded",
        )),
    }
}
