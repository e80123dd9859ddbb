//! Discovery of published versions from the swift.org download page.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use swiftenv_schema::{Arch, VersionRecord};
use thiserror::Error;
use tracing::{debug, info};

/// Default listing page.
pub const DOWNLOAD_URL: &str = "https://swift.org/download/";

/// Token every release archive name starts with.
pub const SOFTWARE_PREFIX: &str = "swift";

const ARCHIVE_EXTENSIONS: [&str; 2] = [".tar.gz", ".pkg"];

/// Pseudo-platform of the macOS debug symbol packages.
const SYMBOLS_PLATFORM: &str = "symbols";

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*["']([^"']*)["']"#).expect("anchor pattern is valid")
});

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid listing URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// An archive link does not follow the `swift-...` naming scheme. The
    /// page format has most likely changed, so nothing scraped can be trusted.
    #[error("Unexpected archive name '{filename}' (expected 'swift-' prefix)")]
    UnexpectedFilename { filename: String },
}

/// A single binary discovered on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    pub version: String,
    pub platform: String,
    pub arch: Arch,
    pub url: String,
}

/// A remote listing of published versions.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Identifier for logs (e.g. the page URL).
    fn key(&self) -> String;

    /// Fetch every version the source currently publishes, sorted by identifier.
    async fn fetch_versions(&self) -> Result<Vec<VersionRecord>, ScrapeError>;
}

/// Scrapes release archives from an HTML download page.
#[derive(Debug, Clone)]
pub struct Scraper {
    client: Client,
    url: String,
}

impl Scraper {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, ScrapeError> {
        let client = Client::builder().user_agent(crate::USER_AGENT).build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the page and parse every release archive on it.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Network`] if the page cannot be fetched and
    /// [`ScrapeError::UnexpectedFilename`] if an archive link is not named
    /// the way the page has always named them.
    pub async fn scrape(&self) -> Result<Vec<VersionRecord>, ScrapeError> {
        let html = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let versions = parse_listing(&html, &self.url)?;
        info!(count = versions.len(), url = %self.url, "scraped versions");
        Ok(versions)
    }
}

#[async_trait]
impl ListingSource for Scraper {
    fn key(&self) -> String {
        self.url.clone()
    }

    async fn fetch_versions(&self) -> Result<Vec<VersionRecord>, ScrapeError> {
        self.scrape().await
    }
}

/// Parse every archive anchor of `html`, resolving links against `base_url`,
/// and group the binaries by version.
///
/// # Errors
///
/// Returns an error if `base_url` is not a URL or an archive link violates
/// the naming scheme.
pub fn parse_listing(html: &str, base_url: &str) -> Result<Vec<VersionRecord>, ScrapeError> {
    let base = Url::parse(base_url).map_err(|e| ScrapeError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    let mut versions: BTreeMap<String, VersionRecord> = BTreeMap::new();

    for cap in HREF_RE.captures_iter(html) {
        let href = cap[1].replace("&amp;", "&");
        let Ok(url) = base.join(&href) else {
            debug!(%href, "skipping unresolvable link");
            continue;
        };

        if let Some(link) = parse_link(&url)? {
            versions
                .entry(link.version.clone())
                .or_insert_with(|| VersionRecord::empty(link.version.clone()))
                .insert_binary(link.platform, link.arch, link.url);
        }
    }

    Ok(versions.into_values().collect())
}

/// Parse an archive URL into its version, platform and architecture.
///
/// Returns `Ok(None)` for links that are not release archives (other files,
/// debug symbols, names without a platform).
///
/// ```
/// use reqwest::Url;
/// use swiftenv_core::scraper::parse_link;
///
/// let url = Url::parse("https://swift.org/builds/swift-3.0.1-release/ubuntu1604/swift-3.0.1-RELEASE/swift-3.0.1-RELEASE-ubuntu16.04.tar.gz").unwrap();
/// let link = parse_link(&url).unwrap().unwrap();
/// assert_eq!(link.version, "3.0.1");
/// assert_eq!(link.platform, "ubuntu16.04");
/// ```
///
/// # Errors
///
/// Returns [`ScrapeError::UnexpectedFilename`] if an archive name does not
/// start with `swift-`.
pub fn parse_link(url: &Url) -> Result<Option<ParsedLink>, ScrapeError> {
    let path = url.path();
    let Some(extension) = ARCHIVE_EXTENSIONS.iter().find(|ext| path.ends_with(*ext)) else {
        return Ok(None);
    };

    let filename = path.rsplit('/').next().unwrap_or(path);
    let Some(rest) = filename
        .strip_prefix(SOFTWARE_PREFIX)
        .and_then(|r| r.strip_prefix('-'))
    else {
        return Err(ScrapeError::UnexpectedFilename {
            filename: filename.to_string(),
        });
    };

    let stem = rest.strip_suffix(*extension).unwrap_or(rest);
    let Some((remainder, platform)) = stem.rsplit_once('-') else {
        debug!(%filename, "skipping archive without platform");
        return Ok(None);
    };

    if platform == SYMBOLS_PLATFORM {
        return Ok(None);
    }

    let version = remainder.replace("-RELEASE", "").replace("-osx", "");

    let (version, platform, arch) = if platform == Arch::Aarch64.as_str() {
        let Some((version, platform)) = version.rsplit_once('-') else {
            debug!(%filename, "skipping aarch64 archive without platform");
            return Ok(None);
        };
        (version.to_string(), platform.to_string(), Arch::Aarch64)
    } else {
        (version, platform.to_string(), Arch::X86_64)
    };

    Ok(Some(ParsedLink {
        version,
        platform,
        arch,
        url: url.to_string(),
    }))
}
