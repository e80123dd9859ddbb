pub mod catalog;
pub mod error;
pub mod git;
pub mod paths;
pub mod reconcile;
pub mod scraper;
pub mod storage;

pub use catalog::{Catalog, Filter};
pub use error::CatalogError;
pub use git::{Git, VersionControl};
pub use paths::*;
pub use reconcile::{ReconcileOptions, ReconcileReport, Reconciler};
pub use scraper::{ListingSource, Scraper};
pub use swiftenv_schema::{Arch, VersionRecord};

/// User Agent string for outgoing requests
pub const USER_AGENT: &str = concat!("swiftenv-core/", env!("CARGO_PKG_VERSION"));
