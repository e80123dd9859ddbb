//! swiftenv-extract binary

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use swiftenv_extract::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    swiftenv_extract::run(&cli).await
}
