//! Resource fetching from the asset host.
//!
//! The [`AssetHost`] trait is the one seam between the pipeline and the
//! network: list resources of one kind, optionally restricted to a
//! `public_id` prefix. Everything downstream is pure and works on the
//! returned records.
//!
//! The production implementation is [`CloudinaryClient`], a blocking Admin
//! API client constructed once with explicit [`Credentials`] and passed by
//! reference. [`SnapshotHost`](crate::snapshot::SnapshotHost) replays a saved
//! fetch offline.
//!
//! ## Listing calls
//!
//! ```text
//! GET https://api.cloudinary.com/v1_1/<cloud>/resources/<kind>/upload
//!     ?max_results=500&context=true[&prefix=<prefix>]
//! Authorization: Basic <api_key:api_secret>
//! ```
//!
//! One page per call, no cursor following. A truncated listing (the response
//! carries `next_cursor`) is logged as a warning.

use crate::config::{CloudinaryConfig, Credentials};
use crate::resource::{Resource, ResourceKind};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Source of resource records.
pub trait AssetHost {
    /// List resources of `kind`, restricted to public ids starting with
    /// `prefix` when given. Every returned record is tagged with `kind`.
    fn list(&self, kind: ResourceKind, prefix: Option<&str>) -> Result<Vec<Resource>, FetchError>;
}

/// Fetch every image, then every video.
pub fn fetch_all(host: &impl AssetHost) -> Result<Vec<Resource>, FetchError> {
    let mut all = Vec::new();
    for kind in ResourceKind::ALL {
        let resources = host.list(kind, None)?;
        debug!(kind = %kind, count = resources.len(), "listed resources");
        all.extend(resources);
    }
    info!(count = all.len(), "fetched resources");
    Ok(all)
}

/// Fetch images then videos under a public id prefix.
pub fn fetch_prefix(host: &impl AssetHost, prefix: &str) -> Result<Vec<Resource>, FetchError> {
    let mut all = Vec::new();
    for kind in ResourceKind::ALL {
        let resources = host.list(kind, Some(prefix))?;
        debug!(kind = %kind, prefix, count = resources.len(), "listed prefix");
        all.extend(resources);
    }
    Ok(all)
}

/// One page of an Admin API listing.
#[derive(Debug, Deserialize)]
struct ListingPage {
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorMessage {
    message: String,
}

/// Blocking Cloudinary Admin API client.
pub struct CloudinaryClient {
    credentials: Credentials,
    api_host: String,
    max_results: u32,
    http: reqwest::blocking::Client,
}

impl CloudinaryClient {
    pub fn new(credentials: Credentials, config: &CloudinaryConfig) -> Self {
        Self {
            credentials,
            api_host: config.api_host.clone(),
            max_results: config.max_results,
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn cloud_name(&self) -> &str {
        &self.credentials.cloud_name
    }

    /// Build the listing endpoint URL for a kind.
    fn listing_url(&self, kind: ResourceKind) -> String {
        format!(
            "https://{}/v1_1/{}/resources/{}/upload",
            self.api_host, self.credentials.cloud_name, kind
        )
    }
}

impl AssetHost for CloudinaryClient {
    fn list(&self, kind: ResourceKind, prefix: Option<&str>) -> Result<Vec<Resource>, FetchError> {
        let mut query = vec![
            ("max_results", self.max_results.to_string()),
            ("context", "true".to_string()),
        ];
        if let Some(prefix) = prefix {
            query.push(("prefix", prefix.to_string()));
        }

        let response = self
            .http
            .get(self.listing_url(kind))
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .query(&query)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let page: ListingPage = response.json()?;
        if page.next_cursor.is_some() {
            warn!(
                kind = %kind,
                prefix = prefix.unwrap_or(""),
                max_results = self.max_results,
                "listing truncated; resources beyond the first page are ignored"
            );
        }
        Ok(tag_kind(page.resources, kind))
    }
}

/// Force the queried kind onto every record.
fn tag_kind(resources: Vec<Resource>, kind: ResourceKind) -> Vec<Resource> {
    resources
        .into_iter()
        .map(|mut r| {
            r.resource_type = kind;
            r
        })
        .collect()
}

/// Extract `error.message` from an API error body, or fall back to the body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
