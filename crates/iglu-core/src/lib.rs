//! # iglu-core — Foundational Types for Iglu Schema Resolution
//!
//! Defines the value types every other crate in the workspace builds on.
//! Nothing here performs I/O.
//!
//! ## Key Types
//!
//! 1. **`SchemaKey`** — an immutable, validated reference of the form
//!    `iglu:<vendor>/<name>/<format>/<version>`. No bare strings for schema
//!    references past the parsing boundary.
//!
//! 2. **`SchemaVer`** — the `MODEL-REVISION-ADDITION` version triple carried
//!    by every key.
//!
//! 3. **`SelfDescribingJson`** — a JSON payload paired with the key of the
//!    schema it claims to conform to.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `iglu-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod envelope;
pub mod error;
pub mod key;

pub use envelope::SelfDescribingJson;
pub use error::IgluError;
pub use key::{SchemaKey, SchemaVer, IGLU_URI_SCHEME};
