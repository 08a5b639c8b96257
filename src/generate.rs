//! One generation run: fetch, classify, group, serialize.
//!
//! ## Phases
//!
//! After the top-level fetch, each bucket is resolved in its own phase, in
//! [`Bucket::PRECEDENCE`] order:
//!
//! ```text
//! fetch_all ──► galleries ──► hero ──► main ──► MediaCatalog
//!                  │            │        │
//!               listing?     listing?  listing?
//! ```
//!
//! A phase only does I/O when its bucket has a listing strategy. A failed
//! listing is logged, recorded as a failed [`PhaseReport`] and leaves that
//! bucket empty; the remaining phases still run. Public ids claimed by an
//! earlier phase are not eligible for later ones.
//!
//! A failed top-level fetch aborts the run before anything is written, so the
//! previous data file and pages stay in place. Pages are written before the
//! data file; if they fail, the previous data file is kept.

use crate::catalog::{CatalogError, MediaCatalog};
use crate::classify::{Bucket, RuleTable};
use crate::client::{self, AssetHost, FetchError};
use crate::config::{self, ConfigError, SiteConfig};
use crate::gallery;
use crate::media::MediaBuilder;
use crate::pages::{self, PagesError, PagesReport};
use crate::resource::Resource;
use crate::snapshot::{Snapshot, SnapshotError, SnapshotHost};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("loading config failed: {0}")]
    Config(#[from] ConfigError),
    #[error("loading snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("writing data file failed: {0}")]
    Catalog(#[from] CatalogError),
    #[error("writing gallery pages failed: {0}")]
    Pages(#[from] PagesError),
}

#[derive(Error, Debug)]
pub enum PhaseError {
    #[error("listing '{prefix}' failed: {source}")]
    Listing {
        prefix: String,
        #[source]
        source: FetchError,
    },
}

/// Outcome of one bucket phase: the number of resources selected, or why the
/// bucket was left empty.
#[derive(Debug)]
pub struct PhaseReport {
    pub bucket: Bucket,
    pub result: Result<usize, PhaseError>,
}

#[derive(Debug)]
pub struct RunReport {
    pub catalog: MediaCatalog,
    pub phases: Vec<PhaseReport>,
}

impl RunReport {
    pub fn failed_phases(&self) -> impl Iterator<Item = &PhaseReport> {
        self.phases.iter().filter(|p| p.result.is_err())
    }

    pub fn is_complete(&self) -> bool {
        self.failed_phases().next().is_none()
    }
}

/// Everything a [`generate`] call produced.
#[derive(Debug)]
pub struct GenerateReport {
    pub run: RunReport,
    pub data_file: PathBuf,
    pub pages: Option<PagesReport>,
}

/// Fetch everything from `host` and build the catalog.
pub fn run(
    host: &impl AssetHost,
    config: &SiteConfig,
    cloud_name: &str,
) -> Result<RunReport, FetchError> {
    let all = client::fetch_all(host)?;
    Ok(build_catalog(host, &all, config, cloud_name))
}

/// Classify already-fetched resources, fetching prefix listings per phase.
pub fn build_catalog(
    host: &impl AssetHost,
    all: &[Resource],
    config: &SiteConfig,
    cloud_name: &str,
) -> RunReport {
    let table = RuleTable::from_config(&config.classify);
    let builder = MediaBuilder::new(cloud_name, &config.delivery);
    let mut catalog = MediaCatalog::default();
    let mut phases = Vec::new();
    let mut claimed: HashSet<String> = HashSet::new();

    for bucket in Bucket::PRECEDENCE {
        let rule = table.rule(bucket);
        let listed = match rule.listing_prefix() {
            Some(prefix) => match client::fetch_prefix(host, prefix) {
                Ok(listed) => listed,
                Err(source) => {
                    warn!(
                        bucket = %bucket,
                        prefix,
                        error = %source,
                        "phase failed, bucket left empty"
                    );
                    phases.push(PhaseReport {
                        bucket,
                        result: Err(PhaseError::Listing {
                            prefix: prefix.to_string(),
                            source,
                        }),
                    });
                    continue;
                }
            },
            None => Vec::new(),
        };

        let selected = table.select(bucket, all, &listed, &claimed);
        claimed.extend(selected.iter().map(|r| r.public_id.clone()));
        let default_alt = rule.default_alt.as_deref();

        match bucket {
            Bucket::Hero => {
                catalog.hero = selected.first().map(|r| builder.build(r, default_alt));
            }
            Bucket::Main => {
                catalog.main = selected
                    .iter()
                    .map(|r| builder.build(r, default_alt))
                    .collect();
            }
            Bucket::Galleries => {
                catalog.galleries =
                    gallery::group(&selected, &builder, &config.galleries, default_alt);
            }
        }
        info!(bucket = %bucket, count = selected.len(), "classified");
        phases.push(PhaseReport {
            bucket,
            result: Ok(selected.len()),
        });
    }

    RunReport { catalog, phases }
}

/// Run the pipeline and write the gallery pages and data file under
/// `site_root`.
pub fn generate(
    site_root: &Path,
    config: &SiteConfig,
    host: &impl AssetHost,
    cloud_name: &str,
) -> Result<GenerateReport, GenerateError> {
    let report = run(host, config, cloud_name)?;

    let pages = if config.pages.enabled {
        Some(pages::write_pages(
            site_root,
            &report.catalog.galleries,
            &config.pages,
        )?)
    } else {
        None
    };

    let data_file = site_root.join(&config.data_file);
    report.catalog.write_data_file(&data_file)?;
    info!(
        path = %data_file.display(),
        items = report.catalog.item_count(),
        galleries = report.catalog.galleries.len(),
        "wrote data file"
    );

    Ok(GenerateReport {
        run: report,
        data_file,
        pages,
    })
}

/// Load `media.toml` from `site_root` and generate from a saved snapshot.
pub fn generate_from_snapshot(
    site_root: &Path,
    snapshot_path: &Path,
) -> Result<GenerateReport, GenerateError> {
    let config = config::load_config(site_root)?;
    let snapshot = Snapshot::load(snapshot_path)?;
    let cloud_name = snapshot.cloud_name.clone();
    generate(site_root, &config, &SnapshotHost::new(snapshot), &cloud_name)
}
