//! Request handlers.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use swiftenv_core::{Arch, Filter};
use swiftenv_schema::{Binaries, VersionRecord};

use crate::AppState;
use crate::error::ApiError;

/// Query string of `GET /versions`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `true` or `false`; any other value is ignored.
    pub snapshot: Option<String>,
    /// Alias of `snapshot`.
    pub snapshots: Option<String>,
    /// Keep versions publishing binaries for this platform.
    pub platform: Option<String>,
}

impl ListQuery {
    /// Only the literal values `true` and `false` filter on snapshots; an
    /// empty platform is ignored.
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::new();
        match self.snapshot.as_deref().or(self.snapshots.as_deref()) {
            Some("true") => filter = filter.snapshot(true),
            Some("false") => filter = filter.snapshot(false),
            _ => {}
        }
        if let Some(platform) = self.platform.as_deref().filter(|p| !p.is_empty()) {
            filter = filter.platform(platform);
        }
        filter
    }
}

/// Query string of the binary endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct BinaryQuery {
    /// Requested architecture; without one the default build is served.
    pub architecture: Option<String>,
}

#[derive(Debug, Serialize)]
struct Link {
    href: String,
}

type Links = BTreeMap<String, Link>;

#[derive(Debug, Serialize)]
struct VersionSummary<'a> {
    version: &'a str,
    is_snapshot: bool,
    #[serde(rename = "_links")]
    links: Links,
}

#[derive(Debug, Serialize)]
struct VersionList<'a> {
    #[serde(rename = "_links")]
    links: Links,
    versions: Vec<VersionSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct VersionDetail<'a> {
    version: &'a str,
    is_snapshot: bool,
    binaries: &'a Binaries,
    #[serde(rename = "_links")]
    links: Links,
}

fn self_link(href: String) -> Links {
    BTreeMap::from([("self".to_string(), Link { href })])
}

fn version_href(version: &str) -> String {
    format!("/versions/{version}")
}

fn accepts(headers: &HeaderMap, needle: &str) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains(needle))
}

fn wants_json(headers: &HeaderMap) -> bool {
    accepts(headers, "application/json") || accepts(headers, "+json")
}

fn plain_text(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Liveness check.
pub async fn health() -> &'static str {
    "ok\n"
}

/// `GET /versions`: identifiers one per line, or a JSON document.
pub async fn list_versions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let view = state.catalog.all().filter(&query.filter())?;
    let versions = view.versions()?;

    if wants_json(&headers) {
        let document = VersionList {
            links: self_link("/versions".to_string()),
            versions: versions
                .iter()
                .map(|record| VersionSummary {
                    version: &record.version,
                    is_snapshot: record.is_snapshot(),
                    links: self_link(version_href(&record.version)),
                })
                .collect(),
        };
        return Ok(Json(document).into_response());
    }

    let names: Vec<&str> = versions.iter().map(|record| record.version.as_str()).collect();
    Ok(plain_text(format!("{}\n", names.join("\n"))))
}

fn find(state: &AppState, name: &str) -> Result<VersionRecord, ApiError> {
    Ok(state.catalog.get(&Filter::new().version(name))?)
}

/// `GET /versions/{name}`
pub async fn get_version(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let record = find(&state, &name)?;

    let mut links = self_link(version_href(&record.version));
    for platform in record.platforms() {
        links.insert(
            format!("binaries/{platform}"),
            Link {
                href: format!("{}/binaries/{platform}", version_href(&record.version)),
            },
        );
    }

    let detail = VersionDetail {
        version: &record.version,
        is_snapshot: record.is_snapshot(),
        binaries: &record.binaries,
        links,
    };
    Ok(Json(detail).into_response())
}

/// `GET /versions/{name}/binaries/{platform}`: redirect to the download,
/// or the bare URL when plain text is accepted.
pub async fn get_binary(
    State(state): State<AppState>,
    Path((name, platform)): Path<(String, String)>,
    Query(query): Query<BinaryQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let record = find(&state, &name)?;

    let url = match query.architecture.as_deref() {
        Some(value) => {
            let arch = value.parse::<Arch>().map_err(|_| ApiError::NotFound)?;
            record.binary(&platform, arch)
        }
        None => record.default_binary(&platform),
    }
    .ok_or(ApiError::NotFound)?;

    if accepts(&headers, "text/plain") {
        return Ok(plain_text(format!("{url}\n")));
    }
    Ok(Redirect::temporary(url).into_response())
}
