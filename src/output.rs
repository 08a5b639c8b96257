//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Output is **content-centric, not file-centric**. The primary display for
//! every entity (bucket, gallery, media item) is its semantic identity (title
//! or alt text, with a positional index), and keys, URLs and file paths are
//! shown as secondary context on indented lines. The output reads as an
//! inventory of what the site will show.
//!
//! # Output Format
//!
//! ## Fetch
//!
//! ```text
//! Fetched 14 resources (12 images, 2 videos)
//!     Listing portfolio/main: 4 resources
//! Snapshot → .cloud-gallery-temp/snapshot.json
//! ```
//!
//! ## Generate
//!
//! ```text
//! Hero
//!     Harbour at dawn
//! Main (2 items)
//!     001 studio
//!     002 walk (video)
//! Galleries
//! 001 Forest (2 items)
//!     Key: 1_forest
//!     001 oak
//!     002 pine
//!
//! Phases
//!     galleries: 2 selected
//!     hero: 1 selected
//!     main: FAILED listing 'portfolio/main' failed: ...
//!
//! Data file → _data/media.yml
//! Pages
//!     001 Forest → gallery/1_forest.html
//!     Removed gallery/9_old.html
//! Generated 1 hero, 2 main items, 1 gallery (2 items)
//! ```
//!
//! ## Structure
//!
//! ```text
//! Total resources: 14
//!
//! By asset_folder
//! 001 galleries/1/forest (2 items)
//!     galleries/1/forest/oak (image/jpg)
//!     ... and 3 more
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::catalog::MediaCatalog;
use crate::generate::{GenerateReport, PhaseReport};
use crate::media::{MediaItem, MediaKind};
use crate::resource::ResourceKind;
use crate::snapshot::Snapshot;
use crate::structure::{FolderGroup, StructureReport};
use std::path::Path;

/// Entries shown per folder group before eliding the rest.
const GROUP_PREVIEW: usize = 10;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn items_label(n: usize) -> String {
    if n == 1 {
        "1 item".to_string()
    } else {
        format!("{n} items")
    }
}

/// Format an entity header: positional index + title, with optional count.
///
/// ```text
/// 001 Forest (2 items)
/// 002 Sea
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, items_label(n)),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Format a media item line: index + alt, videos marked.
///
/// ```text
/// 001 Harbour at dawn
/// 002 walk (video)
/// ```
fn item_line(index: usize, item: &MediaItem) -> String {
    match item.kind {
        MediaKind::Photo => format!("{} {}", format_index(index), item.alt),
        MediaKind::Video => format!("{} {} (video)", format_index(index), item.alt),
    }
}

/// Path relative to `root` when it lies under it.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Fetch output
// ============================================================================

/// Format a captured snapshot summary.
pub fn format_fetch_output(snapshot: &Snapshot, path: &Path) -> Vec<String> {
    let videos = snapshot
        .resources
        .iter()
        .filter(|r| r.resource_type == ResourceKind::Video)
        .count();
    let images = snapshot.resources.len() - videos;

    let mut lines = vec![format!(
        "Fetched {} resources ({} images, {} videos)",
        snapshot.resources.len(),
        images,
        videos
    )];
    for (prefix, listed) in &snapshot.listings {
        lines.push(format!(
            "{}Listing {}: {} resources",
            indent(1),
            prefix,
            listed.len()
        ));
    }
    lines.push(format!("Snapshot \u{2192} {}", path.display()));
    lines
}

pub fn print_fetch_output(snapshot: &Snapshot, path: &Path) {
    for line in format_fetch_output(snapshot, path) {
        println!("{}", line);
    }
}

// ============================================================================
// Catalog and generate output
// ============================================================================

/// Format the catalog as a content inventory.
pub fn format_catalog(catalog: &MediaCatalog) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Hero".to_string());
    match &catalog.hero {
        Some(hero) => lines.push(format!("{}{}", indent(1), hero.alt)),
        None => lines.push(format!("{}(none)", indent(1))),
    }

    lines.push(format!("Main ({})", items_label(catalog.main.len())));
    for (i, item) in catalog.main.iter().enumerate() {
        lines.push(format!("{}{}", indent(1), item_line(i + 1, item)));
    }

    lines.push("Galleries".to_string());
    for (i, gallery) in catalog.galleries.iter().enumerate() {
        lines.push(entity_header(i + 1, &gallery.title, Some(gallery.items.len())));
        lines.push(format!("{}Key: {}", indent(1), gallery.key));
        for (j, item) in gallery.items.iter().enumerate() {
            lines.push(format!("{}{}", indent(1), item_line(j + 1, item)));
        }
    }
    lines
}

/// Format per-bucket phase outcomes.
pub fn format_phases(phases: &[PhaseReport]) -> Vec<String> {
    let mut lines = vec!["Phases".to_string()];
    for phase in phases {
        match &phase.result {
            Ok(count) => lines.push(format!("{}{}: {} selected", indent(1), phase.bucket, count)),
            Err(e) => lines.push(format!("{}{}: FAILED {}", indent(1), phase.bucket, e)),
        }
    }
    lines
}

/// Format a full generate run: inventory, phases, written files, summary.
pub fn format_generate_output(report: &GenerateReport, site_root: &Path) -> Vec<String> {
    let catalog = &report.run.catalog;
    let mut lines = format_catalog(catalog);

    lines.push(String::new());
    lines.extend(format_phases(&report.run.phases));

    lines.push(String::new());
    lines.push(format!(
        "Data file \u{2192} {}",
        relative(&report.data_file, site_root)
    ));

    if let Some(pages) = &report.pages {
        lines.push("Pages".to_string());
        for (i, gallery) in catalog.galleries.iter().enumerate() {
            let written = pages
                .written
                .iter()
                .find(|p| p.file_stem().is_some_and(|stem| stem == gallery.key.as_str()));
            if let Some(path) = written {
                lines.push(format!(
                    "{}{} \u{2192} {}",
                    indent(1),
                    entity_header(i + 1, &gallery.title, None),
                    relative(path, site_root)
                ));
            }
        }
        for path in &pages.removed {
            lines.push(format!("{}Removed {}", indent(1), relative(path, site_root)));
        }
        for path in &pages.skipped {
            lines.push(format!(
                "{}Kept hand-written {}",
                indent(1),
                relative(path, site_root)
            ));
        }
    }

    let gallery_items: usize = catalog.galleries.iter().map(|g| g.items.len()).sum();
    let gallery_word = if catalog.galleries.len() == 1 {
        "gallery"
    } else {
        "galleries"
    };
    lines.push(format!(
        "Generated {} hero, {} main items, {} {} ({})",
        usize::from(catalog.hero.is_some()),
        catalog.main.len(),
        catalog.galleries.len(),
        gallery_word,
        items_label(gallery_items)
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport, site_root: &Path) {
    for line in format_generate_output(report, site_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Structure output
// ============================================================================

fn format_groups(title: &str, groups: &[FolderGroup]) -> Vec<String> {
    let mut lines = vec![title.to_string()];
    for (i, group) in groups.iter().enumerate() {
        lines.push(entity_header(i + 1, &group.folder, Some(group.entries.len())));
        for entry in group.entries.iter().take(GROUP_PREVIEW) {
            lines.push(format!("{}{}", indent(1), entry));
        }
        if group.entries.len() > GROUP_PREVIEW {
            lines.push(format!(
                "{}... and {} more",
                indent(1),
                group.entries.len() - GROUP_PREVIEW
            ));
        }
    }
    lines
}

fn format_candidates(title: &str, ids: &[String]) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", title, items_label(ids.len()))];
    lines.extend(ids.iter().map(|id| format!("{}{}", indent(1), id)));
    lines
}

/// Format the account structure report.
pub fn format_structure_output(report: &StructureReport) -> Vec<String> {
    let mut lines = vec![format!("Total resources: {}", report.total)];
    for section in [
        format_groups("By asset_folder", &report.by_asset_folder),
        format_groups("By public_id folder", &report.by_public_id_folder),
        format_candidates("Hero", &report.hero),
        format_candidates("Main", &report.main),
        format_candidates("Galleries", &report.galleries),
        format_candidates("Unclassified", &report.unclassified),
    ] {
        lines.push(String::new());
        lines.extend(section);
    }
    lines
}

pub fn print_structure_output(report: &StructureReport) {
    for line in format_structure_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Bucket;
    use crate::client::FetchError;
    use crate::config::SiteConfig;
    use crate::generate::{self, PhaseError, RunReport};
    use crate::pages::PagesReport;
    use crate::test_helpers::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn sample_run() -> RunReport {
        let host = MockHost::new(vec![
            image("hero/dawn", "hero"),
            image("main/studio", "main"),
            video("main/walk", "main"),
            image("galleries/1/forest/oak", "galleries/1/forest"),
            image("galleries/1/forest/pine", "galleries/1/forest"),
        ]);
        generate::run(&host, &SiteConfig::default(), "demo").unwrap()
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(1), "    ");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn entity_header_counts() {
        assert_eq!(entity_header(1, "Forest", Some(2)), "001 Forest (2 items)");
        assert_eq!(entity_header(3, "Sea", Some(1)), "003 Sea (1 item)");
        assert_eq!(entity_header(2, "Sea", None), "002 Sea");
    }

    #[test]
    fn relative_strips_site_root() {
        let root = Path::new("/site");
        assert_eq!(relative(Path::new("/site/_data/media.yml"), root), "_data/media.yml");
        assert_eq!(relative(Path::new("/elsewhere/x"), root), "/elsewhere/x");
    }

    // =========================================================================
    // Command output tests
    // =========================================================================

    #[test]
    fn catalog_inventory() {
        let lines = format_catalog(&sample_run().catalog);
        assert_eq!(
            lines,
            vec![
                "Hero",
                "    Hero Image",
                "Main (2 items)",
                "    001 studio",
                "    002 walk (video)",
                "Galleries",
                "001 Forest (2 items)",
                "    Key: 1_forest",
                "    001 oak",
                "    002 pine",
            ]
        );
    }

    #[test]
    fn empty_catalog_inventory() {
        let lines = format_catalog(&MediaCatalog::default());
        assert_eq!(lines, vec!["Hero", "    (none)", "Main (0 items)", "Galleries"]);
    }

    #[test]
    fn phases_show_failures() {
        let phases = vec![
            PhaseReport {
                bucket: Bucket::Galleries,
                result: Ok(3),
            },
            PhaseReport {
                bucket: Bucket::Main,
                result: Err(PhaseError::Listing {
                    prefix: "portfolio/main".into(),
                    source: FetchError::Status {
                        status: 500,
                        message: "boom".into(),
                    },
                }),
            },
        ];
        let lines = format_phases(&phases);
        assert_eq!(lines[1], "    galleries: 3 selected");
        assert!(lines[2].starts_with("    main: FAILED listing 'portfolio/main' failed"));
        assert!(lines[2].contains("boom"));
    }

    #[test]
    fn generate_output_lists_files_and_summary() {
        let root = PathBuf::from("/site");
        let report = GenerateReport {
            run: sample_run(),
            data_file: root.join("_data/media.yml"),
            pages: Some(PagesReport {
                written: vec![root.join("gallery/1_forest.html")],
                removed: vec![root.join("gallery/9_old.html")],
                skipped: vec![root.join("gallery/7_sea.html")],
            }),
        };
        let lines = format_generate_output(&report, &root);
        assert!(lines.contains(&"Data file \u{2192} _data/media.yml".to_string()));
        assert!(lines.contains(&"    001 Forest \u{2192} gallery/1_forest.html".to_string()));
        assert!(lines.contains(&"    Removed gallery/9_old.html".to_string()));
        assert!(lines.contains(&"    Kept hand-written gallery/7_sea.html".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Generated 1 hero, 2 main items, 1 gallery (2 items)"
        );
    }

    #[test]
    fn fetch_output_counts_kinds() {
        let snapshot = Snapshot {
            cloud_name: "demo".into(),
            resources: vec![image("a", ""), image("b", ""), video("c", "")],
            listings: BTreeMap::from([("portfolio/main".to_string(), vec![image("a", "")])]),
        };
        let lines = format_fetch_output(&snapshot, Path::new("temp/snapshot.json"));
        assert_eq!(
            lines,
            vec![
                "Fetched 3 resources (2 images, 1 videos)",
                "    Listing portfolio/main: 1 resources",
                "Snapshot \u{2192} temp/snapshot.json",
            ]
        );
    }

    #[test]
    fn structure_groups_are_elided_after_ten() {
        let report = StructureReport {
            total: 12,
            by_asset_folder: vec![FolderGroup {
                folder: "main".into(),
                entries: (1..=12).map(|i| format!("main/{i}")).collect(),
            }],
            ..StructureReport::default()
        };
        let lines = format_structure_output(&report);
        assert_eq!(lines[0], "Total resources: 12");
        assert!(lines.contains(&"001 main (12 items)".to_string()));
        assert!(lines.contains(&"    main/10".to_string()));
        assert!(!lines.contains(&"    main/11".to_string()));
        assert!(lines.contains(&"    ... and 2 more".to_string()));
        assert!(lines.contains(&"Unclassified (0 items)".to_string()));
    }
}
