//! Listing-Scraper main entry point
//!
//! This is the command-line interface for the Listing-Scraper catalog harvester.

use clap::Parser;
use listing_scraper::config::{load_config_with_hash, revalidate, Config};
use listing_scraper::crawler::{run_scrape, PaginationSettings};
use listing_scraper::record::Schema;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Listing-Scraper: a paginated real-estate catalog harvester
///
/// Listing-Scraper walks the result pages of a listing catalog, opens
/// every listing it finds, extracts a fixed set of attributes and appends
/// one CSV row per listing.
#[derive(Parser, Debug)]
#[command(name = "listing-scraper")]
#[command(version = "0.1.0")]
#[command(about = "A paginated real-estate catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the number of result pages to walk
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Override the number of listings taken from each result page
    #[arg(long, value_name = "N")]
    cap_per_page: Option<usize>,

    /// Override the CSV destination
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show per-field statistics of the CSV output and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if apply_overrides(&mut config, &cli) {
        revalidate(&config)?;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_scrape(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_scraper=info,warn"),
            1 => EnvFilter::new("listing_scraper=debug,info"),
            2 => EnvFilter::new("listing_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides; returns whether anything changed
fn apply_overrides(config: &mut Config, cli: &Cli) -> bool {
    let mut changed = false;
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
        changed = true;
    }
    if let Some(cap) = cli.cap_per_page {
        config.crawler.cap_per_page = cap;
        changed = true;
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
        changed = true;
    }
    changed
}

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config) {
    let settings = PaginationSettings::from_config(config);

    println!("=== Listing-Scraper Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", settings.base_url);
    println!("  Pages: {}", settings.max_pages);
    println!("  Listings per page: {}", settings.cap_per_page);
    println!("  Page retries: {}", settings.page_retries);
    println!(
        "  Settle delay: {}-{}ms",
        config.crawler.min_delay_ms, config.crawler.max_delay_ms
    );
    println!(
        "  Info panel timeout: {}ms",
        config.crawler.info_panel_timeout_ms
    );
    println!(
        "  Minimum populated fields: {}",
        settings.min_populated_fields
    );

    println!("\nRenderer:");
    println!("  User agent: {}", config.renderer.user_agent);
    println!("  Accept-Language: {}", config.renderer.accept_language);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);

    let schema = Schema::listing();
    println!("\nSchema ({} fields):", schema.len());
    for field in schema.fields() {
        println!("  - {} ({:?})", field.name, field.kind);
    }

    println!("\nSelectors:");
    for (name, selector) in config.selectors.css_selectors() {
        println!("  {}: {}", name, selector);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would visit {} through {}",
        settings.page_url(1),
        settings.page_url(settings.max_pages)
    );
}

/// Handles the --stats mode: shows statistics from the CSV output
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use listing_scraper::output::{load_statistics, print_statistics};
    use std::path::Path;

    println!("CSV: {}\n", config.output.csv_path);

    let stats = load_statistics(
        Path::new(&config.output.csv_path),
        Arc::new(Schema::listing()),
    )?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Writing to {} (existing content is replaced)",
        config.output.csv_path
    );

    let summary = match run_scrape(config).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return Err(e.into());
        }
    };

    if summary.status.is_aborted() {
        return Err(format!("scrape {}", summary.status).into());
    }

    tracing::info!("Scrape completed successfully");
    Ok(())
}
