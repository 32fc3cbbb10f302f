use album_carousel::config::{self, CarouselConfig, DiscoveryMode};
use album_carousel::types::{AlbumEntry, AlbumId, Manifest, default_title, placeholder_cover};
use album_carousel::{discover, load, origin::HttpOrigin, output, scan};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "album-carousel")]
#[command(about = "Album manifest builder and loader for a photo carousel")]
#[command(long_about = "\
Album manifest builder and loader for a photo carousel

The image tree is the data source. Files are grouped into albums by name:

  images/
  ├── photo1.JPG                # Cover of album 1 (photo1..photo9)
  ├── photo2.JPG
  ├── album1/                   # album<n>, album-<n> or a<n>
  │   ├── ph1s1.jpg             # ph<album>s<index>: photo 1 of album 1
  │   └── ph1s2.jpg
  ├── a4/
  │   └── harbour.png           # Any image inside a4/ belongs to album 4
  └── manifest.json             # Written by 'album-carousel manifest'

Albums 1, 2 and 3 always exist so a fresh site still shows a carousel.

Run 'album-carousel gen-config' to generate a documented carousel.toml.")]
#[command(version)]
struct Cli {
    /// Site root (holds images/ and carousel.toml)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan images/ and write images/manifest.json
    Manifest,
    /// Load the catalog from the origin and show what the carousel renders
    Catalog {
        /// Origin base URL (overrides carousel.toml)
        #[arg(long)]
        base_url: Option<String>,
        /// Skip cover checks and discovery
        #[arg(long)]
        no_repair: bool,
    },
    /// Probe the origin for one album's photos
    Discover {
        /// Album id
        id: AlbumId,
        /// Cover path whose folder is searched (default images/photo<id>.JPG)
        #[arg(long)]
        cover: Option<String>,
        /// Search album<id>, album-<id>, a<id> and images instead
        #[arg(long)]
        wide: bool,
        /// Origin base URL (overrides carousel.toml)
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Validate images/manifest.json without touching the network
    Check,
    /// Print a stock carousel.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let images_dir = cli.root.join("images");

    match cli.command {
        Command::Manifest => {
            let built = scan::build(&images_dir)?;
            output::print_build_output(&built);
        }
        Command::Catalog {
            base_url,
            no_repair,
        } => {
            let mut config = load_config(&cli.root, base_url)?;
            if no_repair {
                config.loader.repair = false;
            }
            let origin = HttpOrigin::new(&config.origin.base_url)?;
            let loaded = runtime()?.block_on(load::load(&origin, &config));
            output::print_catalog(&loaded);
        }
        Command::Discover {
            id,
            cover,
            wide,
            base_url,
        } => {
            let mut config = load_config(&cli.root, base_url)?;
            if wide {
                config.discovery.mode = DiscoveryMode::Wide;
            }
            let origin = HttpOrigin::new(&config.origin.base_url)?;
            let album = AlbumEntry {
                id,
                title: default_title(id),
                cover: cover.unwrap_or_else(|| placeholder_cover(id)),
                images: Vec::new(),
            };
            let found = runtime()?.block_on(discover::discover(
                &album,
                &origin,
                &config.discovery,
                config.probe.batch_timeout(),
            ));
            output::print_discovery(id, &found);
        }
        Command::Check => {
            let path = images_dir.join(scan::MANIFEST_FILENAME);
            let manifest = read_manifest(&path)?;
            let issues = manifest.validate();
            output::print_check(&path, &manifest, &issues);
            if !issues.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(
    root: &Path,
    base_url: Option<String>,
) -> Result<CarouselConfig, Box<dyn std::error::Error>> {
    let mut config = config::load_config(root)?;
    if let Some(url) = base_url {
        config.origin.base_url = url;
        config.validate()?;
    }
    Ok(config)
}

fn read_manifest(path: &Path) -> Result<Manifest, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Single-threaded runtime: every await point is a network request.
fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
