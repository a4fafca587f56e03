//! Shelf-Scraper main entry point
//!
//! This is the command-line interface for the Shelf-Scraper book catalog scraper.

use anyhow::Context as _;
use clap::Parser;
use shelf_scraper::assets::ImageAcquirer;
use shelf_scraper::config::{
    load_config_with_hash, parse_genre_list, validate, Config, OutputFormat, Target,
    MAX_PAGE_LIMIT, MAX_RETRIES,
};
use shelf_scraper::crawler::{Coordinator, TracingObserver};
use shelf_scraper::output::{print_statistics, RunStamp};
use shelf_scraper::page::{build_http_client, HttpPage};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Shelf-Scraper: a sequential book catalog scraper
///
/// Shelf-Scraper walks the paginated listings of a book catalog, either as one
/// flat stream or one stream per genre, and saves every listed book as JSON or
/// CSV. Cover images can be downloaded alongside.
#[derive(Parser, Debug)]
#[command(name = "shelf-scraper")]
#[command(version)]
#[command(about = "A sequential book catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// What to scrape: books, genre or images
    #[arg(short, long)]
    target: Option<Target>,

    /// Number of listing pages per stream
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=MAX_PAGE_LIMIT as i64))]
    limit: Option<u32>,

    /// Maximum number of genres to scrape
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    genre_limit: Option<u64>,

    /// Comma-separated genre names (implies --target genre)
    #[arg(long, value_name = "A,B")]
    genres: Option<String>,

    /// Download cover images
    #[arg(long)]
    images: bool,

    /// Delay between listing pages in milliseconds
    #[arg(short, long, value_name = "MS")]
    delay: Option<u64>,

    /// Retries per page before it is skipped
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_RETRIES as i64))]
    max_retries: Option<u32>,

    /// Directory for downloaded images
    #[arg(long, value_name = "DIR")]
    assets: Option<String>,

    /// Directory for result files
    #[arg(long, value_name = "DIR")]
    output: Option<String>,

    /// Result file format: json or csv
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.log.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    handle_scrape(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; with `log_file` they are also appended, without colors,
/// to that file.
fn setup_logging(
    verbose: u8,
    quiet: bool,
    log_file: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_scraper=info,warn"),
            1 => EnvFilter::new("shelf_scraper=debug,info"),
            _ => EnvFilter::new("shelf_scraper=trace,debug"),
        }
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false),
        )
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}

/// Applies command-line flags on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    let crawler = &mut config.crawler;

    if let Some(raw) = &cli.genres {
        crawler.genres = Some(parse_genre_list(raw));
    }

    match cli.target {
        Some(target) => crawler.target = target,
        None if cli.genres.is_some() => crawler.target = Target::Genre,
        None => {}
    }

    if let Some(limit) = cli.limit {
        crawler.page_limit = Some(limit);
    }
    if let Some(limit) = cli.genre_limit {
        crawler.genre_limit = Some(limit as usize);
    }
    if cli.images {
        crawler.download_images = true;
    }
    if let Some(delay) = cli.delay {
        crawler.inter_page_delay_ms = delay;
    }
    if let Some(retries) = cli.max_retries {
        crawler.max_retries = retries;
    }
    if let Some(assets) = &cli.assets {
        crawler.assets_dir = assets.clone();
    }

    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config) {
    let crawler = &config.crawler;

    println!("=== Shelf-Scraper Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", crawler.base_url);
    println!("  Target: {}", crawler.target);
    match crawler.page_limit {
        Some(limit) => println!("  Page limit: {}", limit),
        None => println!("  Page limit: none"),
    }
    if let Some(limit) = crawler.genre_limit {
        println!("  Genre limit: {}", limit);
    }
    if let Some(genres) = &crawler.genres {
        println!("  Genres: {}", genres.join(", "));
    }
    println!("  Inter-page delay: {}ms", crawler.inter_page_delay_ms);
    println!(
        "  Retries: {} (backoff {}ms)",
        crawler.max_retries, crawler.retry_backoff_ms
    );

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Format: {}", config.output.format.extension());
    println!("  Per-genre files: {}", config.output.per_genre_files);
    match config.image_root() {
        Some(root) => println!("  Images: {}", root.display()),
        None => println!("  Images: disabled"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Scraping {} from {}",
        config.crawler.target,
        config.crawler.base_url
    );

    let client = build_http_client(&config.http).context("build HTTP client")?;
    let page = HttpPage::new(client.clone());
    let images = ImageAcquirer::new(client);
    let stamp = RunStamp::now(config.crawler.genres.is_some());

    let mut coordinator =
        Coordinator::new(config, page, images, TracingObserver::new(), stamp)?;

    match coordinator.run().await {
        Ok(outcome) => {
            tracing::info!("Scrape completed with {} records", outcome.records.len());
            print_statistics(coordinator.observer().statistics());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
