//! `iglu validate` — validate a self-describing JSON file.
//!
//! Exit code 0 when the instance conforms, 1 when it violates its schema.
//! Unreadable files, malformed envelopes and unresolvable schemas are
//! reported as errors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use iglu_client::{ClientError, Resolver};
use serde_json::Value;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to a JSON file holding `{"schema": ..., "data": ...}`.
    pub file: PathBuf,
}

pub async fn run_validate(args: &ValidateArgs, resolver: &Resolver) -> Result<u8> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let envelope: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", args.file.display()))?;
    validate_envelope(&envelope, resolver).await
}

pub async fn validate_envelope(envelope: &Value, resolver: &Resolver) -> Result<u8> {
    match resolver.validate(envelope).await {
        Ok(()) => {
            println!("OK");
            Ok(0)
        }
        Err(ClientError::SchemaViolation(violations)) => {
            println!("INVALID: {violations}");
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}
