//! # iglu-cli — Command-Line Resolver
//!
//! Provides the `iglu` command-line interface over [`iglu_client::Resolver`].
//!
//! ## Subcommands
//!
//! - `iglu lookup` — print a resolved schema.
//! - `iglu validate` — validate a self-describing JSON file.
//! - `iglu order` — show which registries would be consulted, in order.
//!
//! ```bash
//! iglu --resolver resolver.json lookup iglu:com.acme/event/jsonschema/1-0-0
//! iglu --resolver resolver.json validate event.json
//! iglu -vv order iglu:com.snowplowanalytics.iglu/resolver-config/jsonschema/1-0-2
//! ```

pub mod lookup;
pub mod order;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use iglu_client::Resolver;

/// Build the resolver for a CLI invocation.
///
/// Without a configuration file the resolver holds only the bootstrap
/// repository.
pub fn build_resolver(config: Option<&Path>) -> Result<Resolver> {
    match config {
        Some(path) => Resolver::from_file(path)
            .with_context(|| format!("loading resolver configuration {}", path.display())),
        None => {
            tracing::debug!("no resolver configuration given; using bootstrap only");
            Ok(Resolver::new(Vec::new(), None))
        }
    }
}
