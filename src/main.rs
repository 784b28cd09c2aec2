//! Mini-Spider main entry point
//!
//! This is the command-line interface for the mini-spider crawler.

use anyhow::Context;
use clap::Parser;
use mini_spider::config::{load_config_with_hash, load_seeds, CrawlConfig};
use mini_spider::crawler::crawl;
use mini_spider::output::print_statistics;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "mini_spider.log";

/// Mini-Spider: a bounded-depth, single-target web crawler
///
/// Starting from a list of seed URLs, mini-spider follows links up to a fixed
/// depth and downloads every page whose URL matches the configured pattern.
#[derive(Parser, Debug)]
#[command(name = "mini-spider")]
#[command(version)]
#[command(about = "A bounded-depth, single-target web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE", default_value = "./conf/spider.toml")]
    config: PathBuf,

    /// Directory for the log file
    #[arg(short, long, value_name = "DIR", default_value = "./log")]
    log_dir: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&cli.log_dir, cli.verbose, cli.quiet) {
        eprintln!("mini-spider: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(config).await
}

/// Sets up logging to stdout and to `<log_dir>/mini_spider.log`
fn setup_logging(log_dir: &Path, verbose: u8, quiet: bool) -> anyhow::Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_path = log_dir.join(LOG_FILE_NAME);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mini_spider=info,warn"),
            1 => EnvFilter::new("mini_spider=debug,info"),
            2 => EnvFilter::new("mini_spider=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let stdout_layer = fmt::layer().with_target(false).with_thread_ids(false);
    let file_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

/// Handles the --dry-run mode: validates config and seeds and shows what would
/// be crawled
fn handle_dry_run(config: &CrawlConfig) -> anyhow::Result<()> {
    let seeds = load_seeds(&config.url_list_file)?;

    println!("=== Mini-Spider Dry Run ===\n");

    println!("Spider Configuration:");
    println!("  URL list file: {}", config.url_list_file.display());
    println!("  Output directory: {}", config.output_directory.display());
    println!("  Max depth: {}", config.max_depth);
    println!("  Crawl interval: {}s", config.crawl_interval.as_secs());
    println!("  Crawl timeout: {}s", config.crawl_timeout.as_secs());
    println!("  Target pattern: {}", config.target_pattern.as_str());
    println!("  Thread count: {}", config.thread_count);
    println!("  Stop when idle: {}", config.stop_when_idle);

    println!("\nSeed URLs ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seeds.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: CrawlConfig) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling into {} with pattern [{}]",
        config.output_directory.display(),
        config.target_pattern.as_str()
    );

    let stats = crawl(config).await?;
    tracing::info!("Crawl stopped ({})", stats.stop_reason);
    print_statistics(&stats);

    Ok(())
}
