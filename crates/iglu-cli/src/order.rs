//! `iglu order` — show the resolution order for a key.

use anyhow::Result;
use clap::Args;
use iglu_client::Resolver;
use iglu_core::SchemaKey;

#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Schema key whose resolution order to print.
    pub key: SchemaKey,
}

pub fn run_order(args: &OrderArgs, resolver: &Resolver) -> Result<u8> {
    for line in render_order(resolver, &args.key) {
        println!("{line}");
    }
    Ok(0)
}

/// One line per registry: position, name, kind, priority and whether its
/// vendor prefixes match `key`.
pub fn render_order(resolver: &Resolver, key: &SchemaKey) -> Vec<String> {
    resolver
        .resolution_order(key)
        .into_iter()
        .enumerate()
        .map(|(i, source)| {
            let affinity = if source.vendor_matches(key) {
                " vendor-match"
            } else {
                ""
            };
            format!(
                "{}. {} ({}, priority {}){affinity}",
                i + 1,
                source.name(),
                source.kind(),
                source.descriptor().priority,
            )
        })
        .collect()
}
