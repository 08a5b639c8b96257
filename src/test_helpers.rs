//! Shared test utilities for the cloud-gallery test suite.
//!
//! Provides resource constructors, a recording [`MockHost`], panicking lookup
//! helpers and bulk extractors that work with catalog data structures
//! (`MediaCatalog`, `Gallery`, `MediaItem`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let host = MockHost::new(vec![
//!     image("galleries/3/sunset/dune", "galleries/3/sunset"),
//!     video("galleries/3/sunset/waves", "galleries/3/sunset"),
//! ]);
//! let report = generate::run(&host, &SiteConfig::default(), "demo").unwrap();
//!
//! let gallery = find_gallery(&report.catalog, "3_sunset");
//! assert_eq!(item_alts(&gallery.items), vec!["dune", "waves"]);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;

use crate::catalog::MediaCatalog;
use crate::client::{AssetHost, FetchError};
use crate::gallery::Gallery;
use crate::media::MediaItem;
use crate::resource::{Context, Resource, ResourceKind};

// =========================================================================
// Resource constructors
// =========================================================================

/// Image resource with a `jpg` format.
pub fn image(public_id: &str, folder: &str) -> Resource {
    Resource::new(public_id, ResourceKind::Image)
        .with_folder(folder)
        .with_format("jpg")
}

/// Video resource with an `mp4` format.
pub fn video(public_id: &str, folder: &str) -> Resource {
    Resource::new(public_id, ResourceKind::Video)
        .with_folder(folder)
        .with_format("mp4")
}

/// Flat context map from key/value pairs.
pub fn context(pairs: &[(&str, &str)]) -> Context {
    Context::Map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect::<BTreeMap<_, _>>(),
    )
}

/// Public ids in order.
pub fn ids(resources: &[&Resource]) -> Vec<String> {
    resources.iter().map(|r| r.public_id.clone()).collect()
}

/// Path of the JSON fixtures shipped with the crate.
pub fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

// =========================================================================
// Mock asset host
// =========================================================================

/// Asset host that serves a fixed resource set and records every call.
///
/// Unprefixed listings return all resources of the requested kind. Prefixed
/// listings filter by `public_id` prefix unless a failure was registered for
/// that prefix with [`MockHost::fail_prefix`].
#[derive(Default)]
pub struct MockHost {
    pub resources: Vec<Resource>,
    pub failing_prefixes: HashMap<String, String>,
    pub fail_all: Option<String>,
    pub calls: Mutex<Vec<(ResourceKind, Option<String>)>>,
}

impl MockHost {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self {
            resources,
            ..Self::default()
        }
    }

    pub fn fail_prefix(mut self, prefix: &str, message: &str) -> Self {
        self.failing_prefixes
            .insert(prefix.to_string(), message.to_string());
        self
    }

    pub fn unreachable(message: &str) -> Self {
        Self {
            fail_all: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn get_calls(&self) -> Vec<(ResourceKind, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl AssetHost for MockHost {
    fn list(&self, kind: ResourceKind, prefix: Option<&str>) -> Result<Vec<Resource>, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((kind, prefix.map(String::from)));

        if let Some(message) = &self.fail_all {
            return Err(FetchError::Status {
                status: 503,
                message: message.clone(),
            });
        }
        if let Some(message) = prefix.and_then(|p| self.failing_prefixes.get(p)) {
            return Err(FetchError::Status {
                status: 500,
                message: message.clone(),
            });
        }
        Ok(self
            .resources
            .iter()
            .filter(|r| r.resource_type == kind)
            .filter(|r| prefix.is_none_or(|p| r.public_id.starts_with(p)))
            .cloned()
            .collect())
    }
}

// =========================================================================
// Catalog lookups: panic with a clear message on miss
// =========================================================================

/// Find a gallery by key. Panics if not found.
pub fn find_gallery<'a>(catalog: &'a MediaCatalog, key: &str) -> &'a Gallery {
    catalog
        .galleries
        .iter()
        .find(|g| g.key == key)
        .unwrap_or_else(|| {
            let keys = gallery_keys(catalog);
            panic!("gallery '{key}' not found. Available: {keys:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All gallery keys in display order.
pub fn gallery_keys(catalog: &MediaCatalog) -> Vec<&str> {
    catalog.galleries.iter().map(|g| g.key.as_str()).collect()
}

/// Alt texts in item order.
pub fn item_alts(items: &[MediaItem]) -> Vec<&str> {
    items.iter().map(|i| i.alt.as_str()).collect()
}
