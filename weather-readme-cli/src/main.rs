//! Binary crate for the `weather-readme` job.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Handing the loaded credentials to the scheduler

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cmd = cli::Cli::parse();
    let result = cmd.run().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "weather-readme exited with error");
    }
    result
}
