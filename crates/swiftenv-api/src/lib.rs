//! swiftenv-api - HTTP front end of the version catalog
//!
//! ```text
//! GET /versions                             one identifier per line (or JSON)
//! GET /versions/{name}                      version metadata and binary links
//! GET /versions/{name}/binaries/{platform}  redirect to the download
//! ```

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use swiftenv_core::Catalog;
use tokio::net::TcpListener;

/// State shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The catalog every request reads from.
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Wrap an opened catalog for sharing between handlers.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Build the router over an already opened catalog.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/versions", get(routes::list_versions))
        .route("/versions/:name", get(routes::get_version))
        .route(
            "/versions/:name/binaries/:platform",
            get(routes::get_binary),
        )
        .with_state(state)
}

/// Serve the catalog on `listener` until the server fails.
///
/// # Errors
///
/// Returns an error if accepting connections fails.
pub async fn serve(listener: TcpListener, catalog: Catalog) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, root = %catalog.root().display(), "serving version catalog");
    }
    axum::serve(listener, router(AppState::new(catalog))).await
}
