//! Gallery grouping for the `<marker><number>/<name>/` path convention.
//!
//! Resources in the galleries bucket are split into sub-galleries by the two
//! path segments that follow the marker (default `galleries/`):
//!
//! ```text
//! galleries/3/sunset/dune.jpg    → key "3_sunset", number 3, title "Sunset"
//! galleries/10/old_town/         → key "10_old_town", number 10, title "Old Town"
//! galleries/3/                   → dropped (fewer than two segments)
//! ```
//!
//! The marker is looked up in `asset_folder` first and in `public_id` only
//! when the folder does not contain it. The first occurrence is used.
//!
//! ## Ordering
//!
//! Galleries are ordered by the number segment parsed as an integer, so `2`
//! sorts before `10`. A non-numeric number segment sorts after every
//! numbered gallery; ties keep the order the galleries were first seen in.
//!
//! ## Cover
//!
//! The cover is the first photo. A gallery made only of videos gets a still
//! frame of its first video instead (see [`delivery::video_frame_url`]).

use crate::config::GalleriesConfig;
use crate::delivery;
use crate::media::{MediaBuilder, MediaItem, MediaKind};
use crate::resource::Resource;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// The two path segments that place a resource in a gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryPath {
    /// Number segment as written (`"03"`, `"10"`).
    pub number_segment: String,
    /// Number segment parsed as decimal, if it is one.
    pub number: Option<u32>,
    /// Name segment as written (`"old_town"`).
    pub name: String,
}

impl GalleryPath {
    /// Gallery key: `"{number}_{name}"`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.number_segment, self.name)
    }
}

/// Extract the gallery path of a resource.
///
/// Returns `None` when neither field contains `marker`, or when fewer than
/// two non-empty segments follow it.
pub fn parse_gallery_path(resource: &Resource, marker: &str) -> Option<GalleryPath> {
    let source = if resource.asset_folder.contains(marker) {
        &resource.asset_folder
    } else if resource.public_id.contains(marker) {
        &resource.public_id
    } else {
        return None;
    };
    let (_, rest) = source.split_once(marker)?;
    let mut segments = rest.split('/');
    let number_segment = segments.next().filter(|s| !s.is_empty())?;
    let name = segments.next().filter(|s| !s.is_empty())?;

    Some(GalleryPath {
        number_segment: number_segment.to_string(),
        number: number_segment.parse().ok(),
        name: name.to_string(),
    })
}

/// Display title from a name segment.
///
/// Underscores become spaces; each word gets an uppercase first letter and a
/// lowercase remainder: `old_town` → "Old Town", `NEW_york` → "New York".
pub fn display_title(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A named, ordered sub-collection of the galleries bucket.
///
/// Serialized under its key in the data file, so the identifying fields are
/// skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gallery {
    #[serde(skip)]
    pub key: String,
    #[serde(skip)]
    pub number: Option<u32>,
    #[serde(skip)]
    pub name: String,
    pub title: String,
    #[serde(rename = "title_photo", skip_serializing_if = "Option::is_none")]
    pub cover: Option<MediaItem>,
    pub items: Vec<MediaItem>,
}

impl Gallery {
    fn sort_key(&self) -> u32 {
        self.number.unwrap_or(u32::MAX)
    }
}

/// Pick the cover: first photo, else a frame of the first video.
pub fn select_cover(items: &[MediaItem], frame_transform: &str) -> Option<MediaItem> {
    if let Some(photo) = items.iter().find(|i| i.is_photo()) {
        return Some(photo.clone());
    }
    let first_video = items.iter().find(|i| i.kind == MediaKind::Video)?;
    let url = delivery::video_frame_url(&first_video.url, frame_transform)?;
    Some(MediaItem {
        kind: MediaKind::Photo,
        url,
        alt: first_video.alt.clone(),
        thumbnail_url: None,
        thumbnail: None,
    })
}

/// Group gallery resources into ordered galleries.
///
/// Resources without a valid gallery path are dropped. Items keep the order
/// of `resources` within each gallery.
pub fn group(
    resources: &[&Resource],
    builder: &MediaBuilder,
    config: &GalleriesConfig,
    default_alt: Option<&str>,
) -> Vec<Gallery> {
    let mut galleries: Vec<Gallery> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for resource in resources {
        let Some(path) = parse_gallery_path(resource, &config.marker) else {
            debug!(public_id = %resource.public_id, "no gallery path, dropped");
            continue;
        };
        let key = path.key();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            galleries.push(Gallery {
                key,
                number: path.number,
                title: display_title(&path.name),
                name: path.name.clone(),
                cover: None,
                items: Vec::new(),
            });
            galleries.len() - 1
        });
        galleries[slot].items.push(builder.build(resource, default_alt));
    }

    for gallery in &mut galleries {
        gallery.cover = select_cover(&gallery.items, &config.cover);
    }
    // Stable: equal numbers keep first-seen order.
    galleries.sort_by_key(Gallery::sort_key);
    galleries
}
