use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use travel_gal::config::{self, SiteConfig};
use travel_gal::generate::{self, DestinationPage};
use travel_gal::preferences::FilePreferenceStore;
use travel_gal::resolve::{self, FailureUi, LoadPlan};
use travel_gal::sources::HttpFetcher;
use travel_gal::types::{SourceKind, SourceMode};
use travel_gal::{output, retitle, sync};

#[derive(Parser)]
#[command(name = "travel-gal")]
#[command(about = "Static photo galleries for a travel blog")]
#[command(long_about = "\
Static photo galleries for a travel blog

Each destination in config.toml gets a gallery. Photos come from the first
source that yields any: the manifest API, the OneDrive share, then the local
manifest written by 'travel-gal sync'.

Content structure:

  content/
  ├── config.toml                  # Site config with [destinations.<slug>]
  ├── data/
  │   └── australia.json           # Local manifest (travel-gal sync)
  ├── images/
  │   └── australia/australia-1.jpg
  └── .travel-gal/preferences.json # Remembered source mode per gallery

Source mode: 'auto' runs the fallback chain, 'album' links straight to the
share. Override per run with --gallery-mode or --query \"galleryMode=album\";
the choice is remembered.

Run 'travel-gal gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that resolve galleries.
#[derive(clap::Args, Clone)]
struct ResolveArgs {
    /// Visit query string, e.g. "galleryMode=album"
    #[arg(long)]
    query: Option<String>,

    /// Shortcut for --query galleryMode=<MODE>
    #[arg(long, value_name = "MODE", conflicts_with = "query")]
    gallery_mode: Option<String>,

    /// Load from this source only and show its failure details
    #[arg(long, value_enum)]
    only: Option<OnlySource>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnlySource {
    Api,
    Onedrive,
    Local,
}

impl From<OnlySource> for SourceKind {
    fn from(value: OnlySource) -> Self {
        match value {
            OnlySource::Api => SourceKind::Api,
            OnlySource::Onedrive => SourceKind::OneDrive,
            OnlySource::Local => SourceKind::Local,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Resolve every destination and write the static site
    Build(ResolveArgs),
    /// Resolve every destination and print the outcome without writing
    Resolve(ResolveArgs),
    /// Copy a local photo folder into the site and write its manifest
    Sync {
        /// Folder containing the photos
        #[arg(long)]
        from: PathBuf,
        /// Trip slug, e.g. australia
        #[arg(long)]
        trip: String,
        /// Copy at most this many photos
        #[arg(long)]
        max: Option<usize>,
    },
    /// Rewrite manifest titles from camera timestamps
    Retitle {
        #[arg(long)]
        trip: String,
        /// Display name prefix. Defaults to the title-cased trip
        #[arg(long)]
        title_prefix: Option<String>,
    },
    /// Validate config.toml without fetching anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build(args) => {
            let site = config::load_config(&cli.source)?;
            println!("==> Resolving galleries from {}", cli.source.display());
            let results = resolve_all(&site, &cli.source, &args)?;
            output::print_resolve_output(&results);

            println!("==> Generating HTML → {}", cli.output.display());
            let pages: Vec<DestinationPage> = results
                .into_iter()
                .map(|(gallery, resolution)| DestinationPage {
                    gallery,
                    resolution,
                })
                .collect();
            let generated = generate::generate(&site, &pages, &cli.source, &cli.output)?;
            output::print_generate_output(&generated);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Resolve(args) => {
            let site = config::load_config(&cli.source)?;
            let results = resolve_all(&site, &cli.source, &args)?;
            output::print_resolve_output(&results);
        }
        Command::Sync { from, trip, max } => {
            let report = sync::sync_gallery(&from, &cli.source, &trip, max)?;
            output::print_sync_output(&report);
        }
        Command::Retitle { trip, title_prefix } => {
            let report = retitle::retitle_manifest(&cli.source, &trip, title_prefix.as_deref())?;
            output::print_retitle_output(&report);
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site = config::load_config(&cli.source)?;
            for gallery in site.galleries() {
                let sources: Vec<String> = resolve::planned_sources(&gallery)
                    .into_iter()
                    .map(|(kind, location)| format!("{kind} {location}"))
                    .collect();
                if sources.is_empty() {
                    println!("{}: no source configured", gallery.slug);
                } else {
                    println!("{}: {}", gallery.slug, sources.join(" → "));
                }
            }
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn resolve_all(
    site: &SiteConfig,
    source: &std::path::Path,
    args: &ResolveArgs,
) -> Result<Vec<(config::GalleryConfig, resolve::Resolution)>, Box<dyn std::error::Error>> {
    let base_url = site.base_url()?;
    let fetcher = HttpFetcher::new(&site.fetch, source)?;
    let store = FilePreferenceStore::new(&source.join(&site.site.state_dir));

    let query = match (&args.query, &args.gallery_mode) {
        (Some(q), _) => Some(q.clone()),
        (None, Some(mode)) => {
            if SourceMode::parse(mode).is_none() {
                log::warn!("unknown gallery mode {mode:?}; ignoring");
            }
            Some(format!("galleryMode={mode}"))
        }
        (None, None) => None,
    };

    let plan = match args.only {
        Some(kind) => LoadPlan::Single {
            kind: kind.into(),
            ui: FailureUi::Show,
        },
        None => LoadPlan::Toggle {
            store: &store,
            query: query.as_deref(),
        },
    };

    Ok(resolve::resolve_site(site, &fetcher, &base_url, plan))
}
