use clap::{Parser, Subcommand};
use cloud_gallery::client::{self, CloudinaryClient};
use cloud_gallery::config::{self, Credentials, SiteConfig};
use cloud_gallery::generate::{self, GenerateError, GenerateReport};
use cloud_gallery::output;
use cloud_gallery::snapshot::Snapshot;
use cloud_gallery::structure;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const SNAPSHOT_FILENAME: &str = "snapshot.json";

/// Shared flags for commands that write the site data.
#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Exit with an error when the run fails instead of keeping the previous output
    #[arg(long)]
    strict: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "cloud-gallery")]
#[command(about = "Cloudinary media catalog generator for Jekyll sites")]
#[command(long_about = "\
Cloudinary media catalog generator for Jekyll sites

Lists every image and video in a Cloudinary account, sorts them into the
hero image, the main mosaic and numbered galleries, and writes
_data/media.yml plus one page stub per gallery.

Account layout (asset folders or public id paths):

  hero/                         # Hero image (first match wins)
  main/                         # Main mosaic
  galleries/
  ├── 1/forest/                 # Gallery \"1_forest\", title \"Forest\"
  │   ├── oak.jpg               # Cover: first photo
  │   └── walk.mp4
  └── 10/old_town/              # Gallery \"10_old_town\", sorted after 2, 3, ...
      └── square.jpg

Anything with \"sample\" in its asset folder or public id is ignored.

Prefix listings are opt-in: set `listing` under [classify.hero] or
[classify.main] in media.toml to add every resource under a public id
prefix. Each listing runs as its own phase; a failed listing empties only
that bucket.

Credentials come from CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and
CLOUDINARY_API_SECRET, falling back to [cloudinary] in media.toml. Without
them the run is skipped.

Run 'cloud-gallery gen-config' to generate a documented media.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root (contains media.toml, receives _data/ and gallery/)
    #[arg(long, default_value = ".", global = true)]
    site: PathBuf,

    /// Directory for intermediate files (fetch snapshot)
    #[arg(long, default_value = ".cloud-gallery-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all resources into a local snapshot
    Fetch,
    /// Write the data file and gallery pages from the snapshot
    Generate(RunArgs),
    /// Fetch and generate in one run
    Build(RunArgs),
    /// Show how resources are organised and how the rules classify them
    Structure {
        /// Read the saved snapshot instead of the API
        #[arg(long)]
        offline: bool,
    },
    /// Print a stock media.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let snapshot_path = cli.temp_dir.join(SNAPSHOT_FILENAME);

    match cli.command {
        Command::Fetch => {
            let config = config::load_config(&cli.site)?;
            let Some(api) = connect(&config) else {
                return Ok(());
            };
            let snapshot = Snapshot::capture(&api, &config, api.cloud_name())?;
            snapshot.save(&snapshot_path)?;
            output::print_fetch_output(&snapshot, &snapshot_path);
        }
        Command::Generate(args) => {
            let result = generate::generate_from_snapshot(&cli.site, &snapshot_path).map(Some);
            finish(result, &cli.site, args.strict)?;
        }
        Command::Build(args) => {
            finish(build(&cli.site), &cli.site, args.strict)?;
        }
        Command::Structure { offline } => {
            let config = config::load_config(&cli.site)?;
            let resources = if offline {
                Snapshot::load(&snapshot_path)?.resources
            } else {
                let Some(api) = connect(&config) else {
                    return Ok(());
                };
                client::fetch_all(&api)?
            };
            let report = structure::analyze(&resources, &config.classify);
            output::print_structure_output(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build the API client, or `None` when credentials are incomplete.
fn connect(config: &SiteConfig) -> Option<CloudinaryClient> {
    match Credentials::resolve(&config.cloudinary, |k| std::env::var(k).ok()) {
        Some(credentials) => Some(CloudinaryClient::new(credentials, &config.cloudinary)),
        None => {
            debug!("Cloudinary credentials not configured, skipping");
            None
        }
    }
}

/// Load the site config, fetch from the API and generate. `None` when
/// credentials are missing and the run is skipped.
fn build(site: &Path) -> Result<Option<GenerateReport>, GenerateError> {
    let config = config::load_config(site)?;
    let Some(api) = connect(&config) else {
        return Ok(None);
    };
    info!(site = %site.display(), "building media catalog");
    generate::generate(site, &config, &api, api.cloud_name()).map(Some)
}

/// Report a generate result. A failed run keeps the previous data file and
/// only fails the process under `--strict`.
fn finish(
    result: Result<Option<GenerateReport>, GenerateError>,
    site: &Path,
    strict: bool,
) -> Result<(), GenerateError> {
    match result {
        Ok(Some(report)) => {
            output::print_generate_output(&report, site);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            error!(error = %e, "generation failed, previous data file left in place");
            if strict { Err(e) } else { Ok(()) }
        }
    }
}
