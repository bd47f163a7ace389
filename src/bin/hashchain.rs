//! Interactive shell over a `HashChain` of integers.
//!
//! Reads key/value line pairs from stdin and prints the table after each
//! one. Logging goes to stderr and is controlled by `RUST_LOG`.

use anyhow::{Context, Result};
use clap::Parser;
use hashchain::config::{DEFAULT_BUCKETS, DEFAULT_MAX_KEY_LEN};
use hashchain::{repl, HashChain, MapConfig};
use std::io;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "hashchain")]
#[command(version)]
#[command(about = "Interactive shell over a fixed-bucket chained hash map")]
struct Args {
    /// Number of buckets, fixed for the life of the map
    #[arg(long, default_value_t = DEFAULT_BUCKETS, value_parser = parse_bucket_count)]
    buckets: usize,

    /// Longest key kept, in bytes; longer keys are truncated
    #[arg(long, default_value_t = DEFAULT_MAX_KEY_LEN)]
    max_key_len: usize,
}

/// A bucket count must be a positive integer.
fn parse_bucket_count(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("bucket count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let config = MapConfig::new()
        .with_buckets(args.buckets)
        .with_max_key_len(args.max_key_len);
    let mut map: HashChain<Box<i32>> = match HashChain::with_config(config) {
        Ok(m) => m,
        Err(e) => {
            log::error!("cannot construct map: {}", e);
            return Ok(ExitCode::from(1));
        }
    };
    map.set_destructor(|v: Box<i32>| log::trace!("released value {}", v));

    let pairs = repl::run_session(map, io::stdin().lock(), io::stdout().lock())
        .context("REPL I/O failed")?;
    log::debug!("session ended after {} pairs", pairs);
    Ok(ExitCode::SUCCESS)
}
