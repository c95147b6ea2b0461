//! # Error Types
//!
//! Parse-level failures for schema keys and self-describing envelopes.
//! Both are fatal to the calling operation and never retried.

use thiserror::Error;

/// Errors raised while interpreting Iglu keys and envelopes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IgluError {
    /// The schema key string does not have the `iglu:` shape.
    #[error("malformed schema key {input:?}: {reason}")]
    MalformedIdentifier {
        /// The rejected input, verbatim.
        input: String,
        /// Which part of the key failed to parse.
        reason: String,
    },

    /// A JSON instance lacks the `schema` or `data` property.
    #[error("JSON instance is not self-describing ({missing} property is absent)")]
    NotSelfDescribing {
        /// Name of the missing property.
        missing: &'static str,
    },
}

impl IgluError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
