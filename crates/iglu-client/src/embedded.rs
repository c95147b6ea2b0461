//! Embedded registry: schema documents held locally.
//!
//! Two stores back an embedded registry:
//!
//! - a directory laid out as `<root>/schemas/<vendor-path>/<name>/<format>/<version>`,
//!   one UTF-8 JSON document per file;
//! - a static table of documents compiled into the binary, keyed by
//!   canonical path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use iglu_core::SchemaKey;
use serde_json::Value;

use crate::error::LookupError;
use crate::registry::SourceDescriptor;

/// Directory under the root that holds schema documents.
const SCHEMAS_DIR: &str = "schemas";

/// `(canonical path, JSON document)` pairs compiled into the binary.
pub type BundledSchemas = &'static [(&'static str, &'static str)];

#[derive(Debug, Clone)]
enum Store {
    Directory(PathBuf),
    Bundled(BundledSchemas),
}

#[derive(Debug, Clone)]
pub struct EmbeddedSource {
    descriptor: SourceDescriptor,
    store: Store,
}

impl EmbeddedSource {
    /// Registry over the schema files under `root`.
    pub fn new(descriptor: SourceDescriptor, root: impl Into<PathBuf>) -> Self {
        Self {
            descriptor,
            store: Store::Directory(root.into()),
        }
    }

    /// Registry over documents compiled into the binary.
    pub fn bundled(descriptor: SourceDescriptor, schemas: BundledSchemas) -> Self {
        Self {
            descriptor,
            store: Store::Bundled(schemas),
        }
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    /// Root directory, or `None` for a bundled registry.
    pub fn root(&self) -> Option<&Path> {
        match &self.store {
            Store::Directory(root) => Some(root),
            Store::Bundled(_) => None,
        }
    }

    /// File path the schema for `key` would be stored at, if directory-backed.
    pub fn schema_path(&self, key: &SchemaKey) -> Option<PathBuf> {
        self.root()
            .map(|root| root.join(SCHEMAS_DIR).join(key.canonical_path()))
    }

    /// Read the schema for `key`.
    ///
    /// An absent document is `Ok(None)`; any other I/O or JSON error is a
    /// [`LookupError`].
    pub fn lookup(&self, key: &SchemaKey) -> Result<Option<Value>, LookupError> {
        match &self.store {
            Store::Directory(root) => {
                self.read_file(&root.join(SCHEMAS_DIR).join(key.canonical_path()))
            }
            Store::Bundled(schemas) => {
                let path = key.canonical_path();
                let Some((_, document)) = schemas.iter().find(|(p, _)| *p == path) else {
                    return Ok(None);
                };
                serde_json::from_str(document).map(Some).map_err(|e| {
                    LookupError::new(
                        &self.descriptor.name,
                        format!("invalid bundled JSON for {path}: {e}"),
                    )
                })
            }
        }
    }

    fn read_file(&self, path: &Path) -> Result<Option<Value>, LookupError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LookupError::new(
                    &self.descriptor.name,
                    format!("cannot read {}: {e}", path.display()),
                ))
            }
        };
        serde_json::from_str(&content).map(Some).map_err(|e| {
            LookupError::new(
                &self.descriptor.name,
                format!("invalid JSON in {}: {e}", path.display()),
            )
        })
    }
}
