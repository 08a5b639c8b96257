//! Raw resource records as returned by the asset host's listing API.
//!
//! A [`Resource`] is the unit every later stage works on. Only the fields the
//! pipeline needs are modelled; everything else the API sends (bytes, width,
//! created_at, ...) is ignored on deserialization.
//!
//! ## Context metadata
//!
//! Cloudinary attaches user metadata under `context`. Depending on the API
//! and upload path it arrives in one of two shapes:
//!
//! ```text
//! { "custom": { "alt": "Morning fog" } }          // Admin API listing
//! { "alt": "Morning fog" }                        // flattened
//! [ { "key": "alt", "value": "Morning fog" } ]    // key/value pairs
//! ```
//!
//! [`Resource::context_value`] looks a key up across all three.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Media kind of a resource, also the `<resource_type>` path segment in
/// delivery and Admin API URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Image,
    Video,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Image, ResourceKind::Video];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Video => "video",
        }
    }

    /// Extension used when a record carries no `format`.
    pub fn default_format(self) -> &'static str {
        match self {
            ResourceKind::Image => "jpg",
            ResourceKind::Video => "mp4",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the key/value-pair context shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPair {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// User metadata attached to a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Context {
    Pairs(Vec<ContextPair>),
    Map(BTreeMap<String, serde_json::Value>),
}

impl Context {
    /// Look up `key` directly, then under the nested `custom` map.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Context::Map(map) => map.get(key).and_then(|v| v.as_str()).or_else(|| {
                map.get("custom")
                    .and_then(|custom| custom.get(key))
                    .and_then(|v| v.as_str())
            }),
            Context::Pairs(pairs) => pairs
                .iter()
                .find(|p| p.key == key)
                .and_then(|p| p.value.as_deref()),
        }
    }
}

/// A single remote media asset record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub public_id: String,
    /// Dynamic-folder location. Missing and `null` both read as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub asset_folder: String,
    #[serde(default)]
    pub resource_type: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
}

impl Resource {
    pub fn new(public_id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            public_id: public_id.into(),
            asset_folder: String::new(),
            resource_type: kind,
            format: None,
            context: None,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.asset_folder = folder.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn is_video(&self) -> bool {
        self.resource_type == ResourceKind::Video
    }

    /// Context metadata value for `key`, if the resource carries one.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.as_ref().and_then(|c| c.get(key))
    }

    /// Last `/`-separated segment of the public id.
    pub fn basename(&self) -> &str {
        self.public_id
            .rsplit('/')
            .next()
            .unwrap_or(&self.public_id)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
