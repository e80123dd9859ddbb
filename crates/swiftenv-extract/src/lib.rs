//! swiftenv-extract - keep the version catalog in sync with swift.org
//!
//! Scrapes the download page, writes every version the catalog does not
//! know yet and, on request, commits and pushes the new files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use swiftenv_core::git::Git;
use swiftenv_core::scraper::DOWNLOAD_URL;
use swiftenv_core::{ListingSource, ReconcileOptions, ReconcileReport, Reconciler, Scraper, VersionControl};
use tracing::info;

/// Extract Swift versions from swift.org into the catalog
#[derive(Debug, Parser)]
#[command(name = "swiftenv-extract")]
#[command(author, version)]
pub struct Cli {
    /// Create commits for each version change
    #[arg(long)]
    pub commit: bool,

    /// Push to the remote after extracting versions (implies --commit)
    #[arg(long)]
    pub push: bool,

    /// Rewrite every stored version in the current format instead of scraping
    #[arg(long)]
    pub resave: bool,

    /// Download page to scrape
    #[arg(long, env = "SWIFTENV_DOWNLOAD_URL", default_value = DOWNLOAD_URL)]
    pub url: String,

    /// Directory containing the `versions/` catalog (and its git checkout)
    #[arg(long, env = "SWIFTENV_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Remote to push to
    #[arg(long, default_value = Git::DEFAULT_REMOTE)]
    pub remote: String,

    /// Branch to push
    #[arg(long, default_value = Git::DEFAULT_BRANCH)]
    pub branch: String,
}

impl Cli {
    /// Publishing options selected by the flags.
    pub fn options(&self) -> ReconcileOptions {
        ReconcileOptions::new(self.commit, self.push)
    }
}

/// Run the command line.
///
/// # Errors
///
/// Returns an error if scraping, writing or publishing fails.
pub async fn run(cli: &Cli) -> Result<()> {
    let git = Git::new(&cli.root).with_remote(&cli.remote, &cli.branch);
    let reconciler = Reconciler::new(&cli.root, git, cli.options());

    if cli.resave {
        let count = reconciler.resave().context("Failed to resave versions")?;
        info!(count, "resaved versions");
        return Ok(());
    }

    let scraper = Scraper::new(&cli.url)?;
    let report = extract(&scraper, &reconciler).await?;
    info!(
        added = report.added.len(),
        mismatched = report.mismatched.len(),
        pushed = report.pushed,
        "extraction finished"
    );
    Ok(())
}

/// Fetch the listing from `source` and reconcile it into the catalog.
///
/// # Errors
///
/// Returns an error if the listing cannot be fetched or parsed, or if
/// reconciliation fails.
pub async fn extract<V: VersionControl>(
    source: &dyn ListingSource,
    reconciler: &Reconciler<V>,
) -> Result<ReconcileReport> {
    let versions = source
        .fetch_versions()
        .await
        .with_context(|| format!("Failed to fetch versions from {}", source.key()))?;

    reconciler
        .reconcile(&versions)
        .with_context(|| format!("Failed to reconcile into {}", reconciler.root().display()))
}
