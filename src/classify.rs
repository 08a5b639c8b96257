//! Bucket classification.
//!
//! Every fetched resource is considered for three buckets: `hero` (a single
//! full-width image), `main` (the landing-page mosaic) and `galleries` (the
//! pool later split into numbered sub-galleries by [`crate::gallery`]).
//!
//! ## Rule table
//!
//! Each bucket has a [`BucketRule`]: an ordered list of [`Strategy`] values,
//! a list of exclusion substrings, and a default alt text. Strategies are
//! pure predicates over `(asset_folder, public_id)`, except
//! [`Strategy::Listing`], which matches every resource returned by a
//! prefix listing fetched for the bucket.
//!
//! ```text
//! Folder(["main"])                 asset_folder == "main" || asset_folder contains "main"
//! PublicId { "main", empty: true } asset_folder is empty && public_id contains "main"
//! Listing("portfolio/main")        returned by list(prefix = "portfolio/main")
//! ```
//!
//! A bucket's selection is the union of its strategies in order, deduplicated
//! by `public_id` (first occurrence wins), minus excluded and ignored
//! resources, minus resources already claimed by a higher-precedence bucket.
//!
//! ## Precedence
//!
//! Buckets are resolved in [`Bucket::PRECEDENCE`] order:
//! **galleries → hero → main**. Galleries come first because their path
//! convention is the most specific signal; a photo under
//! `galleries/2/hero_shots/` belongs to that gallery even though its folder
//! contains `hero`. The hero bucket keeps only its first match, and only that
//! one resource is withheld from `main`.
//!
//! The global `ignore` list (default `["sample"]`, matched case-insensitively
//! against both `asset_folder` and `public_id`) applies to every bucket.

use crate::config::{BucketConfig, ClassifyConfig};
use crate::resource::Resource;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Top-level classification target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Hero,
    Main,
    Galleries,
}

impl Bucket {
    /// Resolution order. Earlier buckets claim resources first.
    pub const PRECEDENCE: [Bucket; 3] = [Bucket::Galleries, Bucket::Hero, Bucket::Main];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Hero => "hero",
            Bucket::Main => "main",
            Bucket::Galleries => "galleries",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One way a resource can match a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// `asset_folder` equals or contains any pattern.
    Folder(Vec<String>),
    /// `public_id` contains `needle`, optionally only for folderless resources.
    PublicId {
        needle: String,
        require_empty_folder: bool,
    },
    /// Every resource in the prefix listing.
    Listing(String),
}

impl Strategy {
    /// Field predicate. Listing strategies match by membership, never here.
    pub fn matches(&self, asset_folder: &str, public_id: &str) -> bool {
        match self {
            Strategy::Folder(patterns) => patterns
                .iter()
                .any(|p| asset_folder == p || asset_folder.contains(p.as_str())),
            Strategy::PublicId {
                needle,
                require_empty_folder,
            } => (!require_empty_folder || asset_folder.is_empty()) && public_id.contains(needle),
            Strategy::Listing(_) => false,
        }
    }
}

/// Match rules for one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketRule {
    pub strategies: Vec<Strategy>,
    pub exclude: Vec<String>,
    pub default_alt: Option<String>,
}

impl BucketRule {
    /// Build from config: folder strategy, then public id, then listing.
    pub fn from_config(config: &BucketConfig) -> Self {
        let mut strategies = Vec::new();
        if !config.folders.is_empty() {
            strategies.push(Strategy::Folder(config.folders.clone()));
        }
        if let Some(needle) = &config.public_id {
            strategies.push(Strategy::PublicId {
                needle: needle.clone(),
                require_empty_folder: config.public_id_requires_empty_folder,
            });
        }
        if let Some(prefix) = &config.listing {
            strategies.push(Strategy::Listing(prefix.clone()));
        }
        Self {
            strategies,
            exclude: config.exclude.clone(),
            default_alt: config.default_alt.clone(),
        }
    }

    /// Prefix to list for this bucket, if it has a listing strategy.
    pub fn listing_prefix(&self) -> Option<&str> {
        self.strategies.iter().find_map(|s| match s {
            Strategy::Listing(prefix) => Some(prefix.as_str()),
            _ => None,
        })
    }

    pub fn is_excluded(&self, resource: &Resource) -> bool {
        self.exclude.iter().any(|e| {
            resource.asset_folder.contains(e.as_str()) || resource.public_id.contains(e.as_str())
        })
    }
}

/// The full rule table, keyed by bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    pub hero: BucketRule,
    pub main: BucketRule,
    pub galleries: BucketRule,
    /// Lowercased folder or public id substrings skipped by every bucket.
    pub ignore: Vec<String>,
}

impl RuleTable {
    pub fn from_config(config: &ClassifyConfig) -> Self {
        Self {
            hero: BucketRule::from_config(&config.hero),
            main: BucketRule::from_config(&config.main),
            galleries: BucketRule::from_config(&config.galleries),
            ignore: config.ignore.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    pub fn rule(&self, bucket: Bucket) -> &BucketRule {
        match bucket {
            Bucket::Hero => &self.hero,
            Bucket::Main => &self.main,
            Bucket::Galleries => &self.galleries,
        }
    }

    pub fn is_ignored(&self, resource: &Resource) -> bool {
        let folder = resource.asset_folder.to_lowercase();
        let id = resource.public_id.to_lowercase();
        self.ignore
            .iter()
            .any(|needle| folder.contains(needle.as_str()) || id.contains(needle.as_str()))
    }

    /// Select the resources of one bucket.
    ///
    /// `listed` is the prefix listing for the bucket's listing strategy (empty
    /// when it has none). Public ids in `claimed` are skipped. The hero
    /// bucket is truncated to its first match.
    pub fn select<'a>(
        &self,
        bucket: Bucket,
        all: &'a [Resource],
        listed: &'a [Resource],
        claimed: &HashSet<String>,
    ) -> Vec<&'a Resource> {
        let rule = self.rule(bucket);
        let mut seen: HashSet<&str> = HashSet::new();
        let mut selected = Vec::new();

        for strategy in &rule.strategies {
            let candidates: Box<dyn Iterator<Item = &'a Resource> + '_> = match strategy {
                Strategy::Listing(_) => Box::new(listed.iter()),
                _ => Box::new(
                    all.iter()
                        .filter(|r| strategy.matches(&r.asset_folder, &r.public_id)),
                ),
            };
            for resource in candidates {
                if rule.is_excluded(resource)
                    || self.is_ignored(resource)
                    || claimed.contains(&resource.public_id)
                {
                    continue;
                }
                if seen.insert(resource.public_id.as_str()) {
                    selected.push(resource);
                }
            }
        }

        if bucket == Bucket::Hero {
            selected.truncate(1);
        }
        selected
    }
}

/// Result of classifying a resource set with no listing failures.
#[derive(Debug, Default)]
pub struct Classification<'a> {
    pub hero: Option<&'a Resource>,
    pub main: Vec<&'a Resource>,
    pub galleries: Vec<&'a Resource>,
}

/// Classify a resource set in precedence order.
///
/// `listing` returns the prefix listing for a bucket (empty slice when the
/// bucket has no listing strategy). The pipeline drives the buckets one by
/// one for fault isolation; this helper is the all-in-one pure form.
pub fn classify<'a>(
    table: &RuleTable,
    all: &'a [Resource],
    listing: impl Fn(Bucket) -> &'a [Resource],
) -> Classification<'a> {
    let mut claimed = HashSet::new();
    let mut result = Classification::default();
    for bucket in Bucket::PRECEDENCE {
        let selected = table.select(bucket, all, listing(bucket), &claimed);
        claimed.extend(selected.iter().map(|r| r.public_id.clone()));
        match bucket {
            Bucket::Hero => result.hero = selected.first().copied(),
            Bucket::Main => result.main = selected,
            Bucket::Galleries => result.galleries = selected,
        }
    }
    result
}
