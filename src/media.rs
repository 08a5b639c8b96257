//! Presentation-ready media items.
//!
//! A [`MediaItem`] is derived from exactly one [`Resource`] and carries what
//! the templates and the browser-side gallery script need: a kind, display
//! URLs, and alt text.
//!
//! ## URLs per kind
//!
//! - **Photo**: `url` is the constrained full view (lightbox), `thumbnail_url`
//!   the constrained grid thumbnail. Both come from [`DeliveryConfig`].
//! - **Video**: `url` is the untransformed delivery URL. `thumbnail` is only
//!   set when the resource's context carries one; no poster is generated here.
//!
//! ## Alt text resolution
//!
//! The first non-empty value wins:
//!
//! ```text
//! context.alt → context.custom.alt → bucket default → last public_id segment
//! ```

use crate::config::DeliveryConfig;
use crate::delivery::UrlBuilder;
use crate::resource::{Resource, ResourceKind};
use serde::{Deserialize, Serialize};

/// Media kind as exposed to templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl MediaItem {
    pub fn is_photo(&self) -> bool {
        self.kind == MediaKind::Photo
    }
}

/// Resolve a field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-blank value, trimmed.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Converts resources into media items for one cloud.
#[derive(Debug, Clone)]
pub struct MediaBuilder {
    urls: UrlBuilder,
    delivery: DeliveryConfig,
}

impl MediaBuilder {
    pub fn new(cloud_name: &str, delivery: &DeliveryConfig) -> Self {
        Self {
            urls: UrlBuilder::new(delivery.host.clone(), cloud_name),
            delivery: delivery.clone(),
        }
    }

    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    /// Build the media item for `resource`.
    ///
    /// `default_alt` sits between the resource's own context and the
    /// public-id fallback in the alt resolution order.
    pub fn build(&self, resource: &Resource, default_alt: Option<&str>) -> MediaItem {
        let alt = resolve(&[resource.context_value("alt"), default_alt])
            .unwrap_or_else(|| resource.basename().to_string());
        let format = resource.format.as_deref();

        match resource.resource_type {
            ResourceKind::Video => MediaItem {
                kind: MediaKind::Video,
                url: self
                    .urls
                    .url(ResourceKind::Video, &resource.public_id, format, None),
                alt,
                thumbnail_url: None,
                thumbnail: resolve(&[resource.context_value("thumbnail")]),
            },
            ResourceKind::Image => MediaItem {
                kind: MediaKind::Photo,
                url: self.urls.url(
                    ResourceKind::Image,
                    &resource.public_id,
                    format,
                    Some(&self.delivery.full),
                ),
                alt,
                thumbnail_url: Some(self.urls.url(
                    ResourceKind::Image,
                    &resource.public_id,
                    format,
                    Some(&self.delivery.thumbnail),
                )),
                thumbnail: None,
            },
        }
    }
}
