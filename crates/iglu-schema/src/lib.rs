//! # iglu-schema — Structural Validation
//!
//! Wraps the `jsonschema` crate behind the small capability the resolver
//! needs: given a resolved schema document and a data value, report
//! valid, or invalid with a structured description of every violation.
//!
//! ## Offline Compilation
//!
//! Iglu schemas declare `$schema` as the Iglu self-describing meta-schema
//! and may `$ref` documents hosted elsewhere. Compilation never touches the
//! network: non-standard `$schema` declarations are dropped and the schema is
//! compiled as Draft 4; unresolvable remote references compile as the
//! permissive schema `{}`.

pub mod validate;

pub use validate::{SchemaValidationError, StructuralValidator, Violation, Violations};
