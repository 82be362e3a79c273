use blockpress::cache::PageCache;
use blockpress::config::{self, SiteConfig};
use blockpress::id::PageId;
use blockpress::loader::DocumentLoader;
use blockpress::source::HttpSource;
use blockpress::store::PageStore;
use blockpress::traverse::{self, PendingQueue};
use blockpress::{generate, index, output};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("BLOCKPRESS_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("BLOCKPRESS_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "blockpress")]
#[command(about = "Static site generator for block-structured page graphs")]
#[command(long_about = "\
Static site generator for block-structured page graphs

Pages are fetched from a page API by id, cached as JSON, and rendered to
HTML. A page may start with a metadata header, one `Key: value` per line,
ended by an empty line:

  Date: 2020-01-01T00:00:00Z
  Tags: go, web
  Status: hidden

  First paragraph of the page...

Recognized keys: Id, Tags, Date, CreatedAt, UpdatedAt, Description,
HeaderImage, Collection, Status. Any other key aborts the run and removes
the page from the cache so it is re-fetched once fixed.

Layout after a build:

  cache/<id>.json        # Page tree as fetched
  log/<id>.log.txt       # Request/response log of the last fetch
  www/index.html         # First page that loaded
  www/<id>.html          # Every other visited page
  www/archives.html      # Listing, newest first

Run 'blockpress gen-config' to generate a documented blockpress.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Output directory (overrides `output_dir`)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Ignore cached pages and fetch everything again
    #[arg(long, global = true)]
    no_cache: bool,

    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the page graph from the seeds and write the site
    Build {
        /// Follow links to sub-pages
        #[arg(short, long)]
        recursive: bool,

        /// Page ids to start from (overrides `seeds`)
        seeds: Vec<String>,
    },
    /// Load a single page and print its metadata
    Fetch {
        /// Page id, hyphenated or compact
        id: String,
    },
    /// List the page ids in the cache
    Cached,
    /// Print a stock blockpress.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Build { recursive, seeds } => {
            let mut site_config = load_site_config(&cli)?;
            if *recursive {
                site_config.recursive = true;
            }
            if !seeds.is_empty() {
                site_config.seeds = seeds.clone();
            }
            site_config.validate()?;
            if site_config.seeds.is_empty() {
                return Err("no seed pages: pass ids or set `seeds` in the config".into());
            }

            let mut loader = DocumentLoader::new(open_store(&site_config));
            let queue = PendingQueue::new(site_config.seeds.iter().cloned());

            println!("==> Loading pages");
            let traversal = traverse::traverse(&mut loader, queue, site_config.recursive)?;
            output::print_traversal_output(&traversal);

            println!(
                "==> Writing site → {}",
                site_config.output_dir.display()
            );
            let entries = index::assemble(&traversal.documents);
            let summary = generate::write_site(
                &traversal,
                &entries,
                &site_config.output_dir,
                &site_config.title,
            )?;
            output::print_site_output(&summary, loader.store().stats());

            println!("==> Build complete: {}", site_config.output_dir.display());
        }
        Command::Fetch { id } => {
            let site_config = load_site_config(&cli)?;
            site_config.validate()?;
            let id = PageId::parse(id)?;
            let mut loader = DocumentLoader::new(open_store(&site_config));
            let doc = loader.load(&id)?;
            output::print_document_output(&doc);
        }
        Command::Cached => {
            let site_config = load_site_config(&cli)?;
            let ids = PageCache::new(&site_config.cache_dir).ids();
            output::print_cached_output(&ids);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Config file merged over defaults, with the global CLI overrides applied.
///
/// Not called for `gen-config`, which has to work while the file is broken.
fn load_site_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let mut site_config = config::load_config(&cli.config)?;
    if let Some(output) = &cli.output {
        site_config.output_dir = output.clone();
    }
    if cli.no_cache {
        site_config.use_cache = false;
    }
    Ok(site_config)
}

fn open_store(site_config: &SiteConfig) -> PageStore {
    let source = HttpSource::new(&site_config.source.endpoint, site_config.source.timeout());
    info!(
        "Pages from {} (cache: {}, {})",
        site_config.source.endpoint,
        site_config.cache_dir.display(),
        if site_config.use_cache { "on" } else { "off" }
    );
    PageStore::new(
        Box::new(source),
        PageCache::new(&site_config.cache_dir),
        &site_config.log_dir,
        site_config.use_cache,
    )
}

/// `RUST_LOG` wins when set; otherwise `--verbose` selects `info`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
