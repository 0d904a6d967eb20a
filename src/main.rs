//! directory-harvester main entry point
//!
//! Command-line interface for scraping business listings from an online
//! business directory into CSV.

use anyhow::Context;
use clap::Parser;
use directory_harvester::config::{load_config_with_hash, validate, Config};
use directory_harvester::crawler::{search_url, CrawlSession, SessionFailure};
use directory_harvester::output::{default_output_path, write_records_csv};
use directory_harvester::SearchQuery;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use url::Url;

/// directory-harvester: business listings to CSV
///
/// Walks every result page of a directory search, enriches listings from
/// their detail pages, and writes the deduplicated records to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "directory-harvester")]
#[command(version)]
#[command(about = "Scrape business listings from an online directory", long_about = None)]
struct Cli {
    /// Location to search in, e.g. "Cork"
    #[arg(short = 'l', long = "where", value_name = "LOCATION")]
    location: String,

    /// Business type to search for; omit to match any business
    #[arg(short = 's', long = "what", value_name = "SUBJECT", default_value = "")]
    subject: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// CSV file to write; defaults to a timestamped file in the output directory
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate config and show the first search URL without fetching
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_deref())?;
    let query = SearchQuery::new(cli.subject.trim(), cli.location.trim())?;

    if cli.dry_run {
        handle_dry_run(&config, &query)?;
        return Ok(ExitCode::SUCCESS);
    }

    handle_scrape(&config, &query, cli.output).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("directory_harvester=info,warn"),
            1 => EnvFilter::new("directory_harvester=debug,info"),
            2 => EnvFilter::new("directory_harvester=trace,debug"),
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

/// Loads the config file if one was given, otherwise the built-in defaults
fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            let config = Config::default();
            validate(&config)?;
            tracing::debug!("Using default configuration");
            Ok(config)
        }
    }
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config, query: &SearchQuery) -> anyhow::Result<()> {
    println!("=== directory-harvester Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);

    println!("\nFetching:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!(
        "  Request interval: {}ms (+ up to {}ms jitter)",
        config.fetch.min_interval_ms, config.fetch.interval_jitter_ms
    );
    println!("  Max attempts: {}", config.fetch.max_attempts);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Proxies: {}", config.fetch.proxies.len());

    println!("\nCrawl:");
    println!("  Max pages: {}", config.crawl.max_pages);
    println!(
        "  Page delay: {}-{}ms",
        config.crawl.page_delay_min_ms, config.crawl.page_delay_max_ms
    );
    println!("  County filter: {:?}", config.crawl.county_filter);
    println!("  Detail enrichment: {}", config.crawl.enrich_details);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    let base_url = Url::parse(&config.site.base_url)?;
    println!("\nFirst search URL:");
    println!("  {}", search_url(&base_url, query, 1)?);

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Runs the scrape and writes the CSV
async fn handle_scrape(
    config: &Config,
    query: &SearchQuery,
    output: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    tracing::info!(
        "Searching for '{}' in '{}'",
        query.subject(),
        query.location()
    );

    let mut session = CrawlSession::from_config(config)?;
    let report = match session.scrape(query).await {
        Ok(report) => report,
        Err(failure) => {
            if let SessionFailure::FirstPageUnavailable { source } = &failure {
                tracing::error!("Giving up on {}", source.url());
            }
            eprintln!("{}", failure);
            return Ok(ExitCode::from(2));
        }
    };

    let path = output
        .unwrap_or_else(|| default_output_path(query, Path::new(&config.output.directory)));
    write_records_csv(&report.records, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{}", report.summary);
    println!("Saved {} records to {}", report.records.len(), path.display());

    Ok(ExitCode::SUCCESS)
}
