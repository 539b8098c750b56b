//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `chain_inspector` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Reading targets from arguments and stdin
//! - JSON output and exit status
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use chain_inspector::app::{parse_target, read_requests, render};
use chain_inspector::config::Opt;
use chain_inspector::initialization::init_logger_with;
use chain_inspector::{run_inspections, Inspector};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let mut requests: Vec<_> = opt
        .targets
        .iter()
        .map(|target| parse_target(target, opt.port, opt.sni.as_deref()))
        .collect();
    if opt.stdin {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        requests.extend(
            read_requests(stdin)
                .await
                .context("Failed to read requests from stdin")?,
        );
    }

    if requests.is_empty() {
        eprintln!("chain_inspector: no targets given (pass TARGET arguments or --stdin)");
        process::exit(2);
    }

    let inspector =
        Inspector::new(opt.inspector_config()).context("Failed to initialize TLS client")?;
    let outcomes = run_inspections(&inspector, requests, opt.max_concurrency).await;

    for outcome in &outcomes {
        println!("{}", render(outcome, opt.pretty));
    }

    if outcomes.iter().any(|o| o.is_failure()) {
        process::exit(1);
    }
    Ok(())
}
