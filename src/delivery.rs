//! Delivery URL construction.
//!
//! Cloudinary serves every asset through a URL of the form
//!
//! ```text
//! https://<host>/<cloud_name>/<kind>/upload/[<transform>/]<public_id>.<format>
//! ```
//!
//! where `<transform>` is a comma-separated list of delivery directives
//! (`w_400` width limit, `c_limit` keep aspect, `q_auto` quality,
//! `f_auto` format negotiation, `so_0` video start offset, ...).
//!
//! Public ids sometimes carry the original filename extension
//! (`galleries/1/forest/img_01.jpg`). It is stripped before the record's
//! `format` is appended, so the extension is never doubled.

use crate::resource::ResourceKind;

/// Filename extensions stripped from a public id before composing a URL.
const KNOWN_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "mp4", "mov", "avi"];

/// Extensions stripped from a video URL when deriving a frame URL.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm"];

const VIDEO_UPLOAD: &str = "/video/upload/";

/// Strip a trailing `.<ext>` when `<ext>` is in `extensions` (case-insensitive).
fn strip_extension<'a>(id: &'a str, extensions: &[&str]) -> &'a str {
    match id.rsplit_once('.') {
        Some((stem, ext))
            if !ext.contains('/') && extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) =>
        {
            stem
        }
        _ => id,
    }
}

/// Remove a known image/video extension from a public id.
pub fn clean_public_id(public_id: &str) -> &str {
    strip_extension(public_id, KNOWN_EXTENSIONS)
}

/// Builds delivery URLs for one cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    host: String,
    cloud_name: String,
}

impl UrlBuilder {
    pub fn new(host: impl Into<String>, cloud_name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            cloud_name: cloud_name.into(),
        }
    }

    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }

    /// Compose a delivery URL.
    ///
    /// `format` falls back to `jpg` for images and `mp4` for videos when absent
    /// or empty. `transform` is inserted as its own path segment when given.
    pub fn url(
        &self,
        kind: ResourceKind,
        public_id: &str,
        format: Option<&str>,
        transform: Option<&str>,
    ) -> String {
        let format = format
            .filter(|f| !f.is_empty())
            .unwrap_or(kind.default_format());
        let transform = match transform.filter(|t| !t.is_empty()) {
            Some(t) => format!("{t}/"),
            None => String::new(),
        };
        format!(
            "https://{}/{}/{}/upload/{}{}.{}",
            self.host,
            self.cloud_name,
            kind,
            transform,
            clean_public_id(public_id),
            format
        )
    }
}

/// Derive a still-frame image URL from a video delivery URL.
///
/// Inserts `transform` right after `/video/upload/` and drops the video
/// extension; the transform's `f_*` directive decides the image format.
/// Returns `None` for URLs that are not video delivery URLs.
///
/// ```text
/// https://res.cloudinary.com/demo/video/upload/galleries/3/sunset/clip.mp4
///   → https://res.cloudinary.com/demo/video/upload/so_0,w_1920,c_limit,q_auto:good,f_jpg/galleries/3/sunset/clip
/// ```
pub fn video_frame_url(video_url: &str, transform: &str) -> Option<String> {
    let split = video_url.find(VIDEO_UPLOAD)? + VIDEO_UPLOAD.len();
    let (base, id) = video_url.split_at(split);
    if id.is_empty() {
        return None;
    }
    Some(format!(
        "{}{}/{}",
        base,
        transform,
        strip_extension(id, VIDEO_EXTENSIONS)
    ))
}
