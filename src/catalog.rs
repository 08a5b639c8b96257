//! The media catalog and its YAML data file.
//!
//! The catalog is rebuilt wholesale on every run and written to the site's
//! data directory (`_data/media.yml` by default), where templates read it as
//! `site.data.media`.
//!
//! ```yaml
//! # Auto-generated by cloud-gallery. Do not edit; changes are overwritten.
//! hero:
//!   type: photo
//!   url: https://res.cloudinary.com/demo/image/upload/w_1080,.../hero/dawn.jpg
//!   alt: Hero Image
//!   thumbnail_url: https://res.cloudinary.com/demo/image/upload/w_400,.../hero/dawn.jpg
//! main: []
//! galleries:
//!   3_sunset:
//!     title: Sunset
//!     title_photo: { ... }
//!     items: [ ... ]
//! ```
//!
//! Section order is fixed and every section is always present, so templates
//! never have to guard against a missing key.

use crate::gallery::Gallery;
use crate::media::MediaItem;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::path::Path;
use thiserror::Error;

/// First line of every generated data file.
pub const HEADER: &str = "# Auto-generated by cloud-gallery. Do not edit; changes are overwritten.";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaCatalog {
    pub hero: Option<MediaItem>,
    pub main: Vec<MediaItem>,
    #[serde(serialize_with = "galleries_by_key")]
    pub galleries: Vec<Gallery>,
}

/// Galleries as a mapping keyed by gallery key, in display order.
fn galleries_by_key<S: Serializer>(
    galleries: &[Gallery],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(galleries.len()))?;
    for gallery in galleries {
        map.serialize_entry(&gallery.key, gallery)?;
    }
    map.end()
}

impl MediaCatalog {
    pub fn is_empty(&self) -> bool {
        self.hero.is_none() && self.main.is_empty() && self.galleries.is_empty()
    }

    /// Total number of media items across all sections.
    pub fn item_count(&self) -> usize {
        usize::from(self.hero.is_some())
            + self.main.len()
            + self.galleries.iter().map(|g| g.items.len()).sum::<usize>()
    }

    /// Render the data file: header comment, then the catalog.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        let body = serde_yaml::to_string(self)?;
        Ok(format!("{HEADER}\n{body}"))
    }

    /// Write the data file, creating parent directories as needed.
    pub fn write_data_file(&self, path: &Path) -> Result<(), CatalogError> {
        let yaml = self.to_yaml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use tempfile::TempDir;

    fn photo(url: &str, alt: &str) -> MediaItem {
        MediaItem {
            kind: MediaKind::Photo,
            url: url.to_string(),
            alt: alt.to_string(),
            thumbnail_url: Some(format!("{url}?thumb")),
            thumbnail: None,
        }
    }

    fn gallery(key: &str, title: &str, items: Vec<MediaItem>) -> Gallery {
        Gallery {
            key: key.to_string(),
            number: None,
            name: String::new(),
            title: title.to_string(),
            cover: items.first().cloned(),
            items,
        }
    }

    fn parse(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn empty_catalog_keeps_all_sections() {
        let yaml = MediaCatalog::default().to_yaml().unwrap();
        assert!(yaml.starts_with(HEADER));
        assert!(yaml.contains("hero: null"), "{yaml}");
        assert!(yaml.contains("main: []"), "{yaml}");
        assert!(yaml.contains("galleries: {}"), "{yaml}");
    }

    #[test]
    fn sections_in_fixed_order() {
        let catalog = MediaCatalog {
            hero: Some(photo("h", "Hero Image")),
            main: vec![photo("m", "m")],
            galleries: vec![gallery("1_a", "A", vec![photo("g", "g")])],
        };
        let yaml = catalog.to_yaml().unwrap();
        let hero = yaml.find("\nhero:").unwrap();
        let main = yaml.find("\nmain:").unwrap();
        let galleries = yaml.find("\ngalleries:").unwrap();
        assert!(hero < main && main < galleries);
    }

    #[test]
    fn galleries_keyed_in_display_order() {
        let catalog = MediaCatalog {
            galleries: vec![
                gallery("2_b", "B", vec![photo("b", "b")]),
                gallery("10_c", "C", vec![photo("c", "c")]),
            ],
            ..MediaCatalog::default()
        };
        let yaml = catalog.to_yaml().unwrap();
        assert!(yaml.find("2_b:").unwrap() < yaml.find("10_c:").unwrap());

        let value = parse(&yaml);
        assert_eq!(value["galleries"]["10_c"]["title"], "C");
        assert_eq!(value["galleries"]["2_b"]["title_photo"]["alt"], "b");
    }

    #[test]
    fn quotes_in_alt_round_trip() {
        let alt = r#"The "Old" Harbour's light"#;
        let catalog = MediaCatalog {
            main: vec![photo("u", alt)],
            ..MediaCatalog::default()
        };
        let value = parse(&catalog.to_yaml().unwrap());
        assert_eq!(value["main"][0]["alt"], alt);
    }

    #[test]
    fn counts() {
        let catalog = MediaCatalog {
            hero: Some(photo("h", "h")),
            main: vec![photo("m", "m")],
            galleries: vec![gallery("1_a", "A", vec![photo("g", "g"), photo("k", "k")])],
        };
        assert_eq!(catalog.item_count(), 4);
        assert!(!catalog.is_empty());
        assert!(MediaCatalog::default().is_empty());
    }

    #[test]
    fn write_creates_data_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("_data/media.yml");
        MediaCatalog::default().write_data_file(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(HEADER));
    }
}
