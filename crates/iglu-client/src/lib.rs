//! # iglu-client — Schema Resolution
//!
//! Resolves versioned JSON schemas by [`SchemaKey`](iglu_core::SchemaKey)
//! across a prioritized set of registries and validates self-describing
//! instances against them.
//!
//! ## Components
//!
//! - [`registry`] — the closed set of registry kinds behind [`SchemaSource`],
//!   descriptors, and the resolution order.
//! - [`embedded`] / [`http`] — the two registry implementations.
//! - [`bootstrap`] — the process-wide embedded registry shipped with this
//!   crate; always consulted at priority 0.
//! - [`cache`] — the expiring schema cache.
//! - [`resolver`] — lookup orchestration, fallback and failure aggregation.
//! - [`config`] — building a resolver from a self-describing configuration.
//!
//! ## Failure Model
//!
//! A registry that holds no such schema, or that cannot be reached, never
//! aborts a lookup: its outcome is recorded and the next registry is tried.
//! Only when every registry is exhausted does the caller see a
//! [`ResolverError`] with the full, ordered list of outcomes.

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod embedded;
pub mod error;
pub mod http;
pub mod registry;
pub mod resolver;

pub use bootstrap::{bootstrap_source, BOOTSTRAP_NAME};
pub use cache::{CacheEntry, SchemaCache};
pub use config::{RepositoryConfig, ResolverConfig};
pub use embedded::EmbeddedSource;
pub use error::{ClientError, ConfigError, LookupError, ResolverError, SourceOutcome};
pub use http::HttpSource;
pub use registry::{resolution_order, SchemaSource, SourceDescriptor};
pub use resolver::Resolver;
