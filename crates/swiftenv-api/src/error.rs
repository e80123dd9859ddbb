//! Mapping of catalog failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use swiftenv_core::CatalogError;
use thiserror::Error;

/// Failure of a request handler.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No such version, platform or architecture.
    #[error("Not Found")]
    NotFound,

    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(CatalogError),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => Self::NotFound,
            other => Self::Catalog(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Not Found\n").into_response(),
            Self::Catalog(err) => {
                tracing::error!(error = %err, "catalog unavailable");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n").into_response()
            }
        }
    }
}
