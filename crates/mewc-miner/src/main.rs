//! mine-genesis: search for the genesis blocks of the chain variants.
//!
//! With no arguments every variant is mined in table order; positional
//! chain names restrict the run.

use anyhow::{bail, Result};
use clap::Parser;
use mewc_miner::{default_specs, mine_genesis};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Genesis miner for Meowcoin chain variants.
#[derive(Parser, Debug)]
#[command(name = "mine-genesis")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chain variants to mine (default: all five).
    chains: Vec<String>,

    /// Worker threads per chain (0 = one per core).
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Log level.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let specs = default_specs();
    for name in &args.chains {
        if !specs.iter().any(|spec| spec.name == name) {
            bail!("unknown chain name: {name}");
        }
    }

    for spec in &specs {
        if !args.chains.is_empty() && !args.chains.iter().any(|n| n == spec.name) {
            continue;
        }

        info!(
            chain = spec.name,
            bits = format!("0x{:08x}", spec.bits),
            "starting search"
        );
        let mined = mine_genesis(spec, args.threads)?;

        println!("{}", mined.chain);
        println!("  nonce64: {}", mined.nonce64);
        println!("  mix_hash: {}", mined.mix_hash);
        println!("  pow_hash: {}", mined.pow_hash);
        println!("  genesis_hash: {}", mined.genesis_hash);
        println!("  merkle_root: {}", mined.merkle_root);
        println!("  elapsed: {}s", mined.elapsed.as_secs());
    }

    Ok(())
}
