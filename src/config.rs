//! Site configuration module.
//!
//! Handles loading, validating, and merging `media.toml`. The file lives in the
//! site root next to Jekyll's `_config.yml`. Stock defaults are overridden by
//! whatever the user file specifies; everything is optional.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! data_file = "_data/media.yml"   # Generated data file, relative to the site root
//!
//! [cloudinary]
//! # cloud_name / api_key / api_secret: fallback when the CLOUDINARY_* env vars are unset
//! api_host = "api.cloudinary.com"
//! max_results = 500               # Resources per listing call (1-500)
//!
//! [delivery]
//! host = "res.cloudinary.com"
//! thumbnail = "w_400,c_limit,q_auto,f_auto"
//! full = "w_1080,c_limit,q_auto:eco,f_auto"
//!
//! [classify]
//! ignore = ["sample"]             # Case-insensitive folder/public_id deny list, every bucket
//!
//! [classify.hero]
//! folders = ["hero"]
//! default_alt = "Hero Image"
//!
//! [classify.main]
//! folders = ["main"]
//! public_id = "main"
//! public_id_requires_empty_folder = true
//! exclude = ["hero", "galleries"]
//!
//! [classify.galleries]
//! folders = ["galleries/"]
//! public_id = "galleries/"
//!
//! [galleries]
//! marker = "galleries/"
//! cover = "so_0,w_1920,c_limit,q_auto:good,f_jpg"
//!
//! [pages]
//! enabled = true
//! dir = "gallery"
//! layout = "default"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [classify.main]
//! listing = "portfolio/main"
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Credentials
//!
//! The three API credentials are read from `CLOUDINARY_CLOUD_NAME`,
//! `CLOUDINARY_API_KEY` and `CLOUDINARY_API_SECRET` first and fall back to the
//! `[cloudinary]` table. See [`Credentials::resolve`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the config file in the site root.
pub const CONFIG_FILENAME: &str = "media.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `media.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Generated data file path, relative to the site root.
    pub data_file: String,
    /// Admin API access.
    pub cloudinary: CloudinaryConfig,
    /// Delivery URL host and photo transforms.
    pub delivery: DeliveryConfig,
    /// Bucket rule table.
    pub classify: ClassifyConfig,
    /// Gallery path convention and cover fallback.
    pub galleries: GalleriesConfig,
    /// Per-gallery page stubs.
    pub pages: PagesConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_file: "_data/media.yml".to_string(),
            cloudinary: CloudinaryConfig::default(),
            delivery: DeliveryConfig::default(),
            classify: ClassifyConfig::default(),
            galleries: GalleriesConfig::default(),
            pages: PagesConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_file.trim().is_empty() {
            return Err(ConfigError::Validation("data_file must not be empty".into()));
        }
        if !(1..=500).contains(&self.cloudinary.max_results) {
            return Err(ConfigError::Validation(
                "cloudinary.max_results must be 1-500".into(),
            ));
        }
        if self.cloudinary.api_host.is_empty() || self.delivery.host.is_empty() {
            return Err(ConfigError::Validation(
                "cloudinary.api_host and delivery.host must not be empty".into(),
            ));
        }
        if self.galleries.marker.is_empty() {
            return Err(ConfigError::Validation(
                "galleries.marker must not be empty".into(),
            ));
        }
        for (name, bucket) in [
            ("hero", &self.classify.hero),
            ("main", &self.classify.main),
            ("galleries", &self.classify.galleries),
        ] {
            // An empty pattern is a substring of everything.
            let empty_pattern = bucket.folders.iter().any(String::is_empty)
                || bucket.exclude.iter().any(String::is_empty)
                || bucket.public_id.as_deref() == Some("")
                || bucket.listing.as_deref() == Some("");
            if empty_pattern {
                return Err(ConfigError::Validation(format!(
                    "classify.{name} contains an empty pattern"
                )));
            }
        }
        if self.classify.ignore.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "classify.ignore contains an empty pattern".into(),
            ));
        }
        if self.pages.enabled && self.pages.dir.trim().is_empty() {
            return Err(ConfigError::Validation("pages.dir must not be empty".into()));
        }
        Ok(())
    }
}

/// Admin API access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CloudinaryConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Admin API host.
    pub api_host: String,
    /// Resources requested per listing call. The API caps this at 500.
    pub max_results: u32,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            api_host: "api.cloudinary.com".to_string(),
            max_results: 500,
        }
    }
}

/// Delivery URL settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Delivery CDN host.
    pub host: String,
    /// Transform for photo grid thumbnails.
    pub thumbnail: String,
    /// Transform for the full-size lightbox view.
    pub full: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            host: "res.cloudinary.com".to_string(),
            thumbnail: "w_400,c_limit,q_auto,f_auto".to_string(),
            full: "w_1080,c_limit,q_auto:eco,f_auto".to_string(),
        }
    }
}

/// Classification rules, one table per bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifyConfig {
    /// Resources whose `asset_folder` or `public_id` contains any of these
    /// (case-insensitive) are skipped by every bucket.
    pub ignore: Vec<String>,
    pub hero: BucketConfig,
    pub main: BucketConfig,
    pub galleries: BucketConfig,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            ignore: vec!["sample".to_string()],
            hero: BucketConfig {
                folders: vec!["hero".to_string()],
                default_alt: Some("Hero Image".to_string()),
                ..BucketConfig::default()
            },
            main: BucketConfig {
                folders: vec!["main".to_string()],
                public_id: Some("main".to_string()),
                public_id_requires_empty_folder: true,
                exclude: vec!["hero".to_string(), "galleries".to_string()],
                ..BucketConfig::default()
            },
            galleries: BucketConfig {
                folders: vec!["galleries/".to_string()],
                public_id: Some("galleries/".to_string()),
                ..BucketConfig::default()
            },
        }
    }
}

/// Match strategies for one bucket, tried in field order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BucketConfig {
    /// `asset_folder` equals or contains any of these.
    pub folders: Vec<String>,
    /// `public_id` contains this.
    pub public_id: Option<String>,
    /// Restrict the `public_id` match to resources with no `asset_folder`.
    pub public_id_requires_empty_folder: bool,
    /// Prefix listing whose results all match.
    pub listing: Option<String>,
    /// Substrings of `asset_folder` or `public_id` that reject a match.
    pub exclude: Vec<String>,
    /// Alt text used when a resource has no `alt` context.
    pub default_alt: Option<String>,
}

/// Gallery grouping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleriesConfig {
    /// Path segment that precedes `<number>/<name>`.
    pub marker: String,
    /// Frame-extraction transform for the video cover fallback.
    pub cover: String,
}

impl Default for GalleriesConfig {
    fn default() -> Self {
        Self {
            marker: "galleries/".to_string(),
            cover: "so_0,w_1920,c_limit,q_auto:good,f_jpg".to_string(),
        }
    }
}

/// Per-gallery page stub settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    pub enabled: bool,
    /// Directory for stubs, relative to the site root.
    pub dir: String,
    /// Jekyll layout named in each stub's front matter.
    pub layout: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "gallery".to_string(),
            layout: "default".to_string(),
        }
    }
}

// =============================================================================
// Credentials
// =============================================================================

pub const ENV_CLOUD_NAME: &str = "CLOUDINARY_CLOUD_NAME";
pub const ENV_API_KEY: &str = "CLOUDINARY_API_KEY";
pub const ENV_API_SECRET: &str = "CLOUDINARY_API_SECRET";

/// Resolved Admin API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials: environment first, then config.
    ///
    /// `env` is the variable lookup (`|k| std::env::var(k).ok()` in the CLI).
    /// Returns `None` if any of the three values is missing or blank.
    pub fn resolve(
        config: &CloudinaryConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<Credentials> {
        let pick = |var: &str, fallback: &Option<String>| {
            env(var)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| fallback.clone().filter(|v| !v.trim().is_empty()))
        };
        Some(Credentials {
            cloud_name: pick(ENV_CLOUD_NAME, &config.cloud_name)?,
            api_key: pick(ENV_API_KEY, &config.api_key)?,
            api_secret: pick(ENV_API_SECRET, &config.api_secret)?,
        })
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `media.toml` from a site root as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(site_root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = site_root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `media.toml` in the given site root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(site_root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(site_root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `media.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Cloud Gallery Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Generated data file, relative to the site root.
data_file = "_data/media.yml"

# ---------------------------------------------------------------------------
# Admin API
# ---------------------------------------------------------------------------
[cloudinary]
# Credentials are read from CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and
# CLOUDINARY_API_SECRET first. These keys are only the fallback.
# cloud_name = "my-cloud"
# api_key = "123456789012345"
# api_secret = "..."
api_host = "api.cloudinary.com"

# Resources requested per listing call (the API caps this at 500).
max_results = 500

# ---------------------------------------------------------------------------
# Delivery URLs
# ---------------------------------------------------------------------------
[delivery]
host = "res.cloudinary.com"

# Grid thumbnail for photos: 400px wide max, automatic quality and format.
thumbnail = "w_400,c_limit,q_auto,f_auto"

# Lightbox view for photos: 1080px wide max, economy quality.
full = "w_1080,c_limit,q_auto:eco,f_auto"

# ---------------------------------------------------------------------------
# Classification
# ---------------------------------------------------------------------------
# Precedence: galleries > hero > main. A resource claimed by a bucket is not
# considered by the buckets after it.
#
# Prefix listings are opt-in. Without a `listing` entry a bucket is matched
# from the initial fetch only and makes no extra API calls. Set one to pull
# in every resource under a public_id prefix, e.g. for fixed-folder accounts
# that keep the site under "portfolio/".
[classify]
# Resources whose asset_folder or public_id contains any of these
# (case-insensitive) are never used.
ignore = ["sample"]

[classify.hero]
# asset_folder equals or contains any of these.
folders = ["hero"]
# Only the first match is used.
default_alt = "Hero Image"
# listing = "portfolio/main/hero"

[classify.main]
folders = ["main"]
# public_id contains this...
public_id = "main"
# ...and the resource has no asset_folder.
public_id_requires_empty_folder = true
# Every resource under this public_id prefix matches.
# listing = "portfolio/main"
# Substrings of asset_folder or public_id that reject a match.
exclude = ["hero", "galleries"]

[classify.galleries]
folders = ["galleries/"]
public_id = "galleries/"

# ---------------------------------------------------------------------------
# Gallery grouping
# ---------------------------------------------------------------------------
[galleries]
# Resources under <marker><number>/<name>/ form the gallery "<number>_<name>".
marker = "galleries/"

# Frame extracted from the first video when a gallery has no photo.
cover = "so_0,w_1920,c_limit,q_auto:good,f_jpg"

# ---------------------------------------------------------------------------
# Gallery page stubs (<dir>/<key>.html, permalink /gallery/<key>/)
# ---------------------------------------------------------------------------
[pages]
enabled = true
dir = "gallery"
layout = "default"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_config_has_delivery_transforms() {
        let config = SiteConfig::default();
        assert_eq!(config.delivery.host, "res.cloudinary.com");
        assert_eq!(config.delivery.thumbnail, "w_400,c_limit,q_auto,f_auto");
        assert_eq!(config.delivery.full, "w_1080,c_limit,q_auto:eco,f_auto");
        assert_eq!(config.cloudinary.max_results, 500);
    }

    #[test]
    fn default_config_has_rule_table() {
        let config = SiteConfig::default();
        assert_eq!(config.classify.ignore, vec!["sample"]);
        assert_eq!(config.classify.hero.default_alt.as_deref(), Some("Hero Image"));
        assert!(config.classify.main.public_id_requires_empty_folder);
        assert_eq!(config.classify.main.exclude, vec!["hero", "galleries"]);
        assert_eq!(
            config.classify.galleries.public_id.as_deref(),
            Some("galleries/")
        );
        assert!(config.classify.hero.listing.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[classify.main]
listing = "portfolio/main"
"#;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()))
            .unwrap();
        assert_eq!(config.classify.main.listing.as_deref(), Some("portfolio/main"));
        // Unspecified values in the same table keep their defaults
        assert_eq!(config.classify.main.folders, vec!["main"]);
        assert_eq!(config.classify.hero.folders, vec!["hero"]);
        assert_eq!(config.data_file, "_data/media.yml");
    }

    #[test]
    fn overlay_replaces_arrays() {
        let toml = r#"
[classify.hero]
folders = ["portfolio/hero"]
"#;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()))
            .unwrap();
        assert_eq!(config.classify.hero.folders, vec!["portfolio/hero"]);
        assert_eq!(config.classify.hero.default_alt.as_deref(), Some("Hero Image"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let toml = r#"
[delivery]
hots = "cdn.example.com"
"#;
        let result = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()));
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn max_results_out_of_range_is_invalid() {
        let mut config = SiteConfig::default();
        config.cloudinary.max_results = 501;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.cloudinary.max_results = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn empty_pattern_is_invalid() {
        let mut config = SiteConfig::default();
        config.classify.main.folders.push(String::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("classify.main"));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(stock_defaults_value(), Some(value)).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.delivery.full, defaults.delivery.full);
        assert_eq!(config.galleries.cover, defaults.galleries.cover);
        assert_eq!(config.classify.main.exclude, defaults.classify.main.exclude);
        assert_eq!(config.pages.dir, defaults.pages.dir);
    }

    #[test]
    fn stock_config_leaves_listings_commented_out() {
        let stock = stock_config_toml();
        assert!(stock.contains("Prefix listings are opt-in"));
        assert!(stock.contains("# listing = \"portfolio/main\""));
        let defaults = SiteConfig::default();
        assert!(defaults.classify.hero.listing.is_none());
        assert!(defaults.classify.main.listing.is_none());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.data_file, "_data/media.yml");
        assert!(config.pages.enabled);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
data_file = "_data/cloud.yml"

[pages]
enabled = false
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.data_file, "_data/cloud.yml");
        assert!(!config.pages.enabled);
        assert_eq!(config.pages.layout, "default");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Credentials
    // =========================================================================

    #[test]
    fn credentials_from_config_when_env_unset() {
        let config = CloudinaryConfig {
            cloud_name: Some("demo".into()),
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            ..CloudinaryConfig::default()
        };
        let creds = Credentials::resolve(&config, no_env).unwrap();
        assert_eq!(creds.cloud_name, "demo");
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.api_secret, "secret");
    }

    #[test]
    fn env_wins_over_config() {
        let config = CloudinaryConfig {
            cloud_name: Some("from-config".into()),
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            ..CloudinaryConfig::default()
        };
        let env: HashMap<&str, &str> = HashMap::from([(ENV_CLOUD_NAME, "from-env")]);
        let creds =
            Credentials::resolve(&config, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(creds.cloud_name, "from-env");
        assert_eq!(creds.api_key, "key");
    }

    #[test]
    fn missing_secret_yields_none() {
        let config = CloudinaryConfig {
            cloud_name: Some("demo".into()),
            api_key: Some("key".into()),
            ..CloudinaryConfig::default()
        };
        assert!(Credentials::resolve(&config, no_env).is_none());
    }

    #[test]
    fn blank_env_value_falls_back_to_config() {
        let config = CloudinaryConfig {
            cloud_name: Some("demo".into()),
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            ..CloudinaryConfig::default()
        };
        let creds = Credentials::resolve(&config, |k| {
            (k == ENV_CLOUD_NAME).then(|| "  ".to_string())
        })
        .unwrap();
        assert_eq!(creds.cloud_name, "demo");
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = Credentials {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "hunter2".into(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
