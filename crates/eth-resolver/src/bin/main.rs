//! Resolve Ethereum identifiers to NKN addresses
//!
//! Usage:
//!   eth-resolver --rpc-server https://rpc.example.org \
//!     --contract-address 0x... \
//!     ETH:alice.eth ETH:0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use eth_resolver::Resolver;
use eth_resolver_core::{CacheTimeout, ConfigOverride};

#[derive(Parser, Debug)]
#[command(name = "eth-resolver")]
#[command(about = "Resolve ETH accounts and ENS names to NKN addresses")]
struct Args {
    /// Identifiers to resolve
    #[arg(required = true)]
    identifiers: Vec<String>,

    /// JSON config override file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Identifier prefix handled by the resolver
    #[arg(long)]
    prefix: Option<String>,

    /// Ethereum JSON-RPC endpoint
    #[arg(long)]
    rpc_server: Option<String>,

    /// Account registry contract address
    #[arg(long)]
    contract_address: Option<String>,

    /// Cache entry lifetime in seconds, or "never"
    #[arg(long, value_parser = parse_cache_timeout)]
    cache_timeout: Option<CacheTimeout>,

    /// Connection-open timeout in milliseconds (<= 0 disables)
    #[arg(long, allow_negative_numbers = true)]
    dial_timeout: Option<i64>,

    /// Registry call timeout in milliseconds (<= 0 disables)
    #[arg(long, allow_negative_numbers = true)]
    query_timeout: Option<i64>,

    /// Resolve every identifier a second time to exercise the cache
    #[arg(long)]
    repeat: bool,

    /// Print results as JSON lines
    #[arg(long)]
    json: bool,
}

impl Args {
    fn overrides(&self) -> anyhow::Result<ConfigOverride> {
        let file = match &self.config {
            Some(path) => ConfigOverride::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ConfigOverride::default(),
        };

        let flags = ConfigOverride {
            prefix: self.prefix.clone(),
            rpc_server: self.rpc_server.clone(),
            contract_address: self.contract_address.clone(),
            cache_timeout: self.cache_timeout,
            dial_timeout: self.dial_timeout,
            query_timeout: self.query_timeout,
        };

        Ok(file.overlay(flags))
    }
}

fn parse_cache_timeout(s: &str) -> Result<CacheTimeout, String> {
    if s.eq_ignore_ascii_case("never") {
        return Ok(CacheTimeout::Never);
    }
    s.parse::<i64>()
        .map(CacheTimeout::from_secs)
        .map_err(|_| format!("expected seconds or \"never\", got {s:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let resolver = Resolver::new(Some(args.overrides()?)).await?;

    let rounds = if args.repeat { 2 } else { 1 };
    for round in 0..rounds {
        for identifier in &args.identifiers {
            let start = std::time::Instant::now();
            let result = resolver
                .resolve(identifier)
                .await
                .with_context(|| format!("resolving {identifier}"))?;

            tracing::debug!(
                identifier = %identifier,
                round,
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Resolved"
            );

            if args.json {
                let line = serde_json::json!({
                    "identifier": identifier,
                    "nknAddr": result,
                });
                println!("{line}");
            } else {
                match result {
                    Some(addr) => println!("{identifier} -> {addr}"),
                    None => println!("{identifier} -> not handled"),
                }
            }
        }
    }

    tracing::info!(cached = resolver.cached_entries(), "Done");
    Ok(())
}
