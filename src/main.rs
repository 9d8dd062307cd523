use clap::{Parser, Subcommand};
use ogcard::emit::{self, BuildContext, EmitReport, OgImageEmitter};
use ogcard::fetch::HttpFetcher;
use ogcard::fonts::{DiskFontCache, FontCache, FontResolver, MemoryFontCache};
use ogcard::render::emoji::{CachedEmoji, TwemojiProvider};
use ogcard::render::{Quality, ResvgBackend};
use ogcard::{config, meta, output, types};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that download fonts.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the font cache: download every font, store nothing
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "ogcard")]
#[command(about = "Open Graph image generator for static sites")]
#[command(long_about = "\
Open Graph image generator for static sites

Renders a social preview card for every page of a site build and prints the
<meta> tags that reference it. The host build supplies parsed pages as JSON:

  pages.json     [{ \"slug\": \"notes/rust\", \"file_path\": \"content/notes/rust.md\",
                    \"frontmatter\": { \"title\": \"…\", \"tags\": [\"rust\"] },
                    \"dates\": { \"modified\": \"2024-02-11\" },
                    \"description\": \"…\", \"text\": \"…\" }, …]
  changes.json   [{ \"type\": \"add\" | \"change\" | \"delete\", \"file\": { …page… } }, …]

Output:

  <output>/<slug>-og-image.webp    one card per page without a socialImage

Fonts come from Google Fonts and are cached under <cache-dir>/fonts/.

Run 'ogcard gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site config file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Output directory (the site's public root)
    #[arg(long, default_value = "public", global = true)]
    output: PathBuf,

    /// Directory for cached downloads
    #[arg(long, default_value = ".ogcard-cache", global = true)]
    cache_dir: PathBuf,

    /// Show debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render cards for every page of a build
    Build {
        /// Page manifest (JSON array of pages)
        #[arg(long)]
        pages: PathBuf,
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Render cards for added and changed pages only
    Update {
        /// Change list (JSON array of change events)
        #[arg(long)]
        changes: PathBuf,
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Print the image meta tags for every page
    Meta {
        /// Page manifest (JSON array of pages)
        #[arg(long)]
        pages: PathBuf,
    },
    /// Resolve the theme fonts and report where each came from
    Fonts(CacheArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build { pages, cache } => {
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);
            let pages = emit::eligible_pages(types::read_pages(&pages)?, &site_config);
            let emitter = build_emitter(site_config, &cli.cache_dir, cache.no_cache);

            println!("==> Rendering {} pages → {}", pages.len(), cli.output.display());
            let report = run_with_printer(&cli.output, |tx| {
                emitter.emit_all(&BuildContext::new(&cli.output), &pages, Some(tx))
            });
            finish(&report)?;
        }
        Command::Update { changes, cache } => {
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);
            let changes = emit::eligible_changes(types::read_changes(&changes)?, &site_config);
            let emitter = build_emitter(site_config, &cli.cache_dir, cache.no_cache);

            println!("==> Updating {} changes → {}", changes.len(), cli.output.display());
            let report = run_with_printer(&cli.output, |tx| {
                emitter.emit_changes(&BuildContext::new(&cli.output), &changes, Some(tx))
            });
            finish(&report)?;
        }
        Command::Meta { pages } => {
            let site_config = config::load_config(&cli.config)?;
            for page in types::read_pages(&pages)? {
                let tags = meta::og_image_tags(&page, &site_config, &site_config.og_image);
                output::print_meta_tags(&page.slug, &tags);
            }
        }
        Command::Fonts(cache) => {
            let site_config = config::load_config(&cli.config)?;
            let resolver = font_resolver(&site_config, &cli.cache_dir, cache.no_cache);
            let typography = &site_config.theme.typography;
            let (fonts, stats) = resolver.load(&typography.header, &typography.body);
            output::print_font_summary(&stats, &fonts);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `--verbose` forces debug; otherwise `RUST_LOG`, defaulting to warnings.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn font_resolver(
    site_config: &config::SiteConfig,
    cache_dir: &Path,
    no_cache: bool,
) -> FontResolver {
    let cache: Box<dyn FontCache> = if no_cache {
        Box::new(MemoryFontCache::new())
    } else {
        Box::new(DiskFontCache::new(cache_dir))
    };
    let fetcher = HttpFetcher::new(site_config.og_image.fetch_timeout());
    FontResolver::new(cache, Box::new(fetcher))
}

fn build_emitter(
    site_config: config::SiteConfig,
    cache_dir: &Path,
    no_cache: bool,
) -> OgImageEmitter<ResvgBackend> {
    let resolver = font_resolver(&site_config, cache_dir, no_cache);
    let emoji = CachedEmoji::new(TwemojiProvider::new(Box::new(HttpFetcher::new(
        site_config.og_image.fetch_timeout(),
    ))));
    let backend = ResvgBackend::new(
        Quality::new(site_config.og_image.quality),
        Box::new(emoji),
    );
    OgImageEmitter::new(site_config, resolver, backend)
}

/// Run a batch while a printer thread streams its events to stdout.
fn run_with_printer(
    output_root: &Path,
    batch: impl FnOnce(std::sync::mpsc::Sender<emit::EmitEvent>) -> EmitReport,
) -> EmitReport {
    let (tx, rx) = std::sync::mpsc::channel();
    let root = output_root.to_path_buf();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_emit_event(&event, &root) {
                println!("{}", line);
            }
        }
    });
    let report = batch(tx);
    printer.join().ok();
    report
}

fn finish(report: &EmitReport) -> Result<(), Box<dyn std::error::Error>> {
    println!("Fonts: {}", report.font_stats);
    output::print_emit_summary(report);
    if report.has_failures() {
        return Err(format!("{} page(s) failed to render", report.failed.len()).into());
    }
    Ok(())
}
