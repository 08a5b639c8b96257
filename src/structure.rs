//! Account structure analysis for the `structure` command.
//!
//! Groups every resource two ways, by `asset_folder` and by the folder part
//! of its `public_id`, and shows which resources the current rule table
//! would place in each bucket. Used to tune `[classify.*]` rules against a
//! real account before generating.

use crate::classify::{self, Bucket, RuleTable};
use crate::config::ClassifyConfig;
use crate::resource::Resource;
use std::collections::{BTreeMap, HashSet};

/// Group label for resources without an asset folder.
pub const NO_ASSET_FOLDER: &str = "(no asset_folder)";
/// Group label for public ids without a `/`.
pub const ROOT_FOLDER: &str = "(root)";

/// Resources sharing one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderGroup {
    pub folder: String,
    /// Display labels, in fetch order.
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureReport {
    pub total: usize,
    pub by_asset_folder: Vec<FolderGroup>,
    pub by_public_id_folder: Vec<FolderGroup>,
    pub hero: Vec<String>,
    pub main: Vec<String>,
    pub galleries: Vec<String>,
    /// Public ids no bucket selects.
    pub unclassified: Vec<String>,
}

fn into_groups(map: BTreeMap<String, Vec<String>>) -> Vec<FolderGroup> {
    map.into_iter()
        .map(|(folder, entries)| FolderGroup { folder, entries })
        .collect()
}

fn public_ids(resources: &[&Resource]) -> Vec<String> {
    resources.iter().map(|r| r.public_id.clone()).collect()
}

fn no_listing<'a>(_: Bucket) -> &'a [Resource] {
    &[]
}

/// Analyse a fetched resource set. Listing strategies are not evaluated.
pub fn analyze(resources: &[Resource], config: &ClassifyConfig) -> StructureReport {
    let mut by_asset_folder: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut by_public_id_folder: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for r in resources {
        let folder = if r.asset_folder.is_empty() {
            NO_ASSET_FOLDER
        } else {
            r.asset_folder.as_str()
        };
        let format = r.format.as_deref().unwrap_or("?");
        by_asset_folder
            .entry(folder.to_string())
            .or_default()
            .push(format!("{} ({}/{})", r.public_id, r.resource_type, format));

        let (id_folder, file) = r
            .public_id
            .rsplit_once('/')
            .unwrap_or((ROOT_FOLDER, r.public_id.as_str()));
        by_public_id_folder
            .entry(id_folder.to_string())
            .or_default()
            .push(file.to_string());
    }

    let table = RuleTable::from_config(config);
    let result = classify::classify(&table, resources, no_listing);
    let hero: Vec<&Resource> = result.hero.into_iter().collect();

    let claimed: HashSet<&str> = hero
        .iter()
        .chain(&result.main)
        .chain(&result.galleries)
        .map(|r| r.public_id.as_str())
        .collect();
    let unclassified = resources
        .iter()
        .filter(|r| !claimed.contains(r.public_id.as_str()))
        .map(|r| r.public_id.clone())
        .collect();

    StructureReport {
        total: resources.len(),
        by_asset_folder: into_groups(by_asset_folder),
        by_public_id_folder: into_groups(by_public_id_folder),
        hero: public_ids(&hero),
        main: public_ids(&result.main),
        galleries: public_ids(&result.galleries),
        unclassified,
    }
}
