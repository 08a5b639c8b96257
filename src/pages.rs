//! Per-gallery page stubs.
//!
//! Each gallery gets `<site>/<dir>/<key>.html` containing only front matter;
//! the layout renders the gallery from the data file by `gallery_key`:
//!
//! ```text
//! ---
//! # Auto-generated by cloud-gallery. Do not edit; changes are overwritten.
//! layout: default
//! title: Sunset Gallery
//! permalink: /gallery/3_sunset/
//! gallery_key: 3_sunset
//! ---
//! ```
//!
//! Stubs carrying the marker line whose gallery no longer exists are removed.
//! Files without the marker are never touched, so hand-written pages can live
//! in the same directory. A hand-written page named after a gallery key wins
//! over the stub and is reported as skipped.

use crate::config::PagesConfig;
use crate::gallery::Gallery;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Marker line identifying generated stubs.
pub const MARKER: &str = crate::catalog::HEADER;

#[derive(Error, Debug)]
pub enum PagesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Serialize)]
struct FrontMatter<'a> {
    layout: &'a str,
    title: String,
    permalink: String,
    gallery_key: &'a str,
}

/// Files touched by one [`write_pages`] call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PagesReport {
    pub written: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    /// Existing pages without the marker, left as they are.
    pub skipped: Vec<PathBuf>,
}

/// Site path of a gallery page.
pub fn permalink(config: &PagesConfig, key: &str) -> String {
    format!("/{}/{}/", config.dir.trim_matches('/'), key)
}

/// Render the stub for one gallery.
pub fn render_stub(gallery: &Gallery, config: &PagesConfig) -> Result<String, serde_yaml::Error> {
    let front = FrontMatter {
        layout: &config.layout,
        title: format!("{} Gallery", gallery.title),
        permalink: permalink(config, &gallery.key),
        gallery_key: &gallery.key,
    };
    let yaml = serde_yaml::to_string(&front)?;
    Ok(format!("---\n{MARKER}\n{yaml}---\n"))
}

/// Write one stub per gallery and remove stale generated stubs.
pub fn write_pages(
    site_root: &Path,
    galleries: &[Gallery],
    config: &PagesConfig,
) -> Result<PagesReport, PagesError> {
    let dir = site_root.join(&config.dir);
    fs::create_dir_all(&dir)?;
    let mut report = PagesReport::default();

    let current: HashSet<&str> = galleries.iter().map(|g| g.key.as_str()).collect();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        let is_stale = path.extension().is_some_and(|e| e == "html")
            && path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| !current.contains(stem));
        if is_stale && is_generated(&path)? {
            fs::remove_file(&path)?;
            debug!(path = %path.display(), "removed stale page");
            report.removed.push(path);
        }
    }

    for gallery in galleries {
        let path = dir.join(format!("{}.html", gallery.key));
        if path.exists() && !is_generated(&path)? {
            warn!(path = %path.display(), "hand-written page in the way, stub not written");
            report.skipped.push(path);
            continue;
        }
        fs::write(&path, render_stub(gallery, config)?)?;
        report.written.push(path);
    }
    report.removed.sort();
    info!(
        written = report.written.len(),
        removed = report.removed.len(),
        skipped = report.skipped.len(),
        "wrote gallery pages"
    );
    Ok(report)
}

/// Whether the file carries the marker line. Content need not be UTF-8.
fn is_generated(path: &Path) -> Result<bool, std::io::Error> {
    let bytes = fs::read(path)?;
    Ok(bytes
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .any(|line| line == MARKER.as_bytes()))
}
