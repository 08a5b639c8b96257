//! Saved fetches for offline runs.
//!
//! `fetch` writes everything one generation run would read from the API into
//! a JSON snapshot; `generate` replays it through [`SnapshotHost`] without
//! credentials or network access. This keeps the split between the
//! network-bound stage and the pure classification stage visible on disk, and
//! lets a run be reproduced exactly.
//!
//! ```json
//! {
//!   "cloud_name": "demo",
//!   "resources": [ { "public_id": "hero/dawn", "asset_folder": "hero", ... } ],
//!   "listings": { "portfolio/main": [ ... ] }
//! }
//! ```
//!
//! `listings` holds one entry per bucket listing prefix configured at capture
//! time. A prefix that was not captured is answered by filtering `resources`
//! by `public_id` prefix, which is what the listing API does.

use crate::classify::{Bucket, RuleTable};
use crate::client::{self, AssetHost, FetchError};
use crate::config::SiteConfig;
use crate::resource::{Resource, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Cloud the resources were fetched from; delivery URLs need it.
    #[serde(default)]
    pub cloud_name: String,
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub listings: BTreeMap<String, Vec<Resource>>,
}

impl Snapshot {
    /// Fetch all resources plus every configured listing prefix.
    ///
    /// A failed top-level fetch is an error. A failed prefix listing is logged
    /// and left out, so replay falls back to prefix filtering for it.
    pub fn capture(
        host: &impl AssetHost,
        config: &SiteConfig,
        cloud_name: &str,
    ) -> Result<Self, FetchError> {
        let resources = client::fetch_all(host)?;
        let table = RuleTable::from_config(&config.classify);
        let mut listings = BTreeMap::new();

        for bucket in Bucket::PRECEDENCE {
            let Some(prefix) = table.rule(bucket).listing_prefix() else {
                continue;
            };
            if listings.contains_key(prefix) {
                continue;
            }
            match client::fetch_prefix(host, prefix) {
                Ok(listed) => {
                    listings.insert(prefix.to_string(), listed);
                }
                Err(e) => warn!(bucket = %bucket, prefix, error = %e, "listing not captured"),
            }
        }

        Ok(Self {
            cloud_name: cloud_name.to_string(),
            resources,
            listings,
        })
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(
            path = %path.display(),
            resources = self.resources.len(),
            listings = self.listings.len(),
            "saved snapshot"
        );
        Ok(())
    }
}

/// [`AssetHost`] that answers from a [`Snapshot`].
pub struct SnapshotHost {
    snapshot: Snapshot,
}

impl SnapshotHost {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl AssetHost for SnapshotHost {
    fn list(&self, kind: ResourceKind, prefix: Option<&str>) -> Result<Vec<Resource>, FetchError> {
        let source = match prefix {
            Some(p) => match self.snapshot.listings.get(p) {
                Some(listed) => listed,
                None => {
                    return Ok(self
                        .snapshot
                        .resources
                        .iter()
                        .filter(|r| r.resource_type == kind && r.public_id.starts_with(p))
                        .cloned()
                        .collect());
                }
            },
            None => &self.snapshot.resources,
        };
        Ok(source
            .iter()
            .filter(|r| r.resource_type == kind)
            .cloned()
            .collect())
    }
}
