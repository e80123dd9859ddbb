//! swiftenv-api server binary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use swiftenv_core::Catalog;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve the swiftenv version catalog over HTTP")]
struct Args {
    /// Directory containing the `versions/` catalog
    #[arg(long, env = "SWIFTENV_ROOT", default_value = ".")]
    root: PathBuf,

    /// Address to listen on
    #[arg(long, env = "SWIFTENV_BIND", default_value = "127.0.0.1:8000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    swiftenv_api::serve(listener, Catalog::open(args.root))
        .await
        .context("Server failed")
}
