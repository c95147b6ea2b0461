//! # iglu CLI entry point
//!
//! Parses command-line arguments, builds the resolver and dispatches to
//! subcommand handlers on a single-threaded tokio runtime.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use iglu_cli::lookup::{run_lookup, LookupArgs};
use iglu_cli::order::{run_order, OrderArgs};
use iglu_cli::validate::{run_validate, ValidateArgs};

/// Iglu schema resolver.
///
/// Resolves versioned JSON schemas from prioritized registries and validates
/// self-describing JSON against them.
#[derive(Parser, Debug)]
#[command(name = "iglu", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Resolver configuration file. Defaults to the bootstrap registry only.
    #[arg(long, global = true)]
    resolver: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a schema and print it.
    Lookup(LookupArgs),

    /// Validate a self-describing JSON file against its schema.
    Validate(ValidateArgs),

    /// Print the order in which registries are consulted for a key.
    Order(OrderArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to start runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = runtime.block_on(async {
        let resolver = iglu_cli::build_resolver(cli.resolver.as_deref())?;
        match &cli.command {
            Commands::Lookup(args) => run_lookup(args, &resolver).await,
            Commands::Validate(args) => run_validate(args, &resolver).await,
            Commands::Order(args) => run_order(args, &resolver),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_lookup() {
        let cli =
            Cli::try_parse_from(["iglu", "lookup", "iglu:com.acme/event/jsonschema/1-0-0"]).unwrap();
        if let Commands::Lookup(args) = cli.command {
            assert_eq!(args.key.name(), "event");
            assert!(!args.compact);
        } else {
            panic!("expected lookup");
        }
        assert!(cli.resolver.is_none());
    }

    #[test]
    fn cli_rejects_malformed_key() {
        assert!(Cli::try_parse_from(["iglu", "lookup", "iglu:com.acme/event"]).is_err());
    }

    #[test]
    fn cli_parse_validate_with_global_resolver() {
        let cli = Cli::try_parse_from([
            "iglu",
            "validate",
            "event.json",
            "--resolver",
            "resolver.json",
        ])
        .unwrap();
        assert_eq!(cli.resolver, Some(PathBuf::from("resolver.json")));
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("event.json"));
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_order_verbose() {
        let cli = Cli::try_parse_from([
            "iglu",
            "-vv",
            "order",
            "iglu:com.acme/event/jsonschema/1-0-0",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Order(_)));
    }

    #[test]
    fn cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["iglu"]).is_err());
    }
}
