//! `iglu lookup` — resolve one schema and print it.

use anyhow::{Context, Result};
use clap::Args;
use iglu_client::Resolver;
use iglu_core::SchemaKey;

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Schema key, e.g. `iglu:com.acme/event/jsonschema/1-0-0`.
    pub key: SchemaKey,

    /// Print compact JSON instead of pretty-printed JSON.
    #[arg(long)]
    pub compact: bool,
}

pub async fn run_lookup(args: &LookupArgs, resolver: &Resolver) -> Result<u8> {
    let schema = resolver.lookup_schema(&args.key).await?;
    let rendered = if args.compact {
        serde_json::to_string(&schema)
    } else {
        serde_json::to_string_pretty(&schema)
    }
    .context("rendering schema")?;
    println!("{rendered}");
    Ok(0)
}
