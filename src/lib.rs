//! # Cloud Gallery
//!
//! A build-time media catalog generator for Jekyll sites whose photos and
//! videos live on Cloudinary. The asset host is the data source: folders and
//! public ids decide where an asset shows up, and numbered gallery folders
//! decide gallery order.
//!
//! # Architecture: Fetch, Classify, Serialize
//!
//! ```text
//! 1. Fetch      Admin API   →  [Resource]           (snapshot.json with `fetch`)
//! 2. Classify   [Resource]  →  hero / main / galleries
//! 3. Build      buckets     →  MediaCatalog         (URLs, alt text, covers)
//! 4. Write      catalog     →  _data/media.yml + gallery/<key>.html
//! ```
//!
//! Only stage 1 touches the network, through the [`client::AssetHost`] trait.
//! Everything after it is a pure function of the fetched records and the
//! config, so the whole pipeline is tested against in-memory hosts, and a
//! saved [`snapshot`] reproduces a run offline.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `media.toml` loading, merging onto stock defaults, validation, credentials |
//! | [`resource`] | Raw resource records and their context metadata |
//! | [`client`] | `AssetHost` trait and the blocking Cloudinary Admin API client |
//! | [`classify`] | Rule table and bucket selection with explicit precedence |
//! | [`gallery`] | `galleries/<number>/<name>/` grouping, titles, covers, ordering |
//! | [`delivery`] | Delivery URL construction and video frame URLs |
//! | [`media`] | Resource → `MediaItem` with alt text resolution |
//! | [`catalog`] | The catalog and its YAML data file |
//! | [`generate`] | One generation run with per-bucket fault isolation |
//! | [`snapshot`] | Saved fetches and offline replay |
//! | [`pages`] | Per-gallery page stubs |
//! | [`structure`] | Account structure analysis for rule tuning |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Precedence
//!
//! A resource can satisfy several bucket rules at once (a photo under
//! `galleries/2/hero_shots/` matches the hero folder pattern too). Buckets
//! are resolved in a fixed order, galleries then hero then main, and a
//! resource claimed by one bucket is never offered to a later one. Every
//! resource appears at most once on the site.
//!
//! ## Partial Results Over No Results
//!
//! Each bucket phase that needs its own listing call can fail on its own. A
//! failed phase leaves its bucket empty and is reported; the others still
//! produce their sections. Only a failure of the initial fetch aborts the
//! run, and then nothing is written, so the previous data file keeps
//! serving the site.
//!
//! ## Numeric Gallery Order
//!
//! Gallery folders are numbered (`galleries/1/forest`, `galleries/10/city`)
//! and sorted by the parsed number, so `2` comes before `10` without zero
//! padding.

pub mod catalog;
pub mod classify;
pub mod client;
pub mod config;
pub mod delivery;
pub mod gallery;
pub mod generate;
pub mod media;
pub mod output;
pub mod pages;
pub mod resource;
pub mod snapshot;
pub mod structure;

#[cfg(test)]
pub(crate) mod test_helpers;
