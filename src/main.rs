//! Tiercrawl main entry point
//!
//! This is the command-line interface for the Tiercrawl product crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tiercrawl::config::{load_config_with_hash, Config};
use tiercrawl::crawler::build_crawler;
use tiercrawl::output::{print_statistics, write_records, write_snapshot};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Tiercrawl: a polite, priority-aware web crawler
///
/// Tiercrawl walks a site from a seed address, visiting product pages before
/// further listing pages, and writes the products it finds to a CSV file.
/// Press Ctrl-C to stop early and dump the crawl state to the snapshot
/// directory.
#[derive(Parser, Debug)]
#[command(name = "tiercrawl")]
#[command(version)]
#[command(about = "A polite, priority-aware web crawler", long_about = None)]
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

    /// Override the visit budget from the configuration
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    max_visits: Option<u64>,

    /// Override the CSV file receiving collected records
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(max_visits) = cli.max_visits {
        config.crawler.max_visits = usize::try_from(max_visits)
            .context("--max-visits does not fit this platform")?;
    }
    if let Some(output) = cli.output {
        config.output.records_path = output.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tiercrawl=info,warn"),
            1 => EnvFilter::new("tiercrawl=debug,info"),
            2 => EnvFilter::new("tiercrawl=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Tiercrawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed: {}", config.crawler.seed);
    println!("  Max visits: {}", config.crawler.max_visits);

    println!("\nPoliteness:");
    println!(
        "  Delay after each fetch: {}-{}ms",
        config.politeness.min_delay_ms, config.politeness.max_delay_ms
    );
    println!("  Retries on 429: {}", config.politeness.max_retries);
    println!(
        "  Default Retry-After: {}s (max {}s)",
        config.politeness.default_retry_after_secs, config.politeness.max_retry_after_secs
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);
    println!("  Snapshot: {}", config.output.snapshot_dir);

    println!("\nSite Rules:");
    println!("  Visit: {}", config.site.visit_pattern);
    println!("  Collect: {}", config.site.collect_pattern);
    println!("  Disallowed paths ({}):", config.site.disallow.len());
    for path in &config.site.disallow {
        println!("    - {}", path);
    }

    println!("\n✓ Configuration is valid");
}

/// Spawns the Ctrl-C handler
///
/// First Ctrl-C asks the crawl to stop after the current visit. Second
/// Ctrl-C exits immediately without writing anything.
fn setup_shutdown_handler() -> watch::Receiver<bool> {
    let (stop_tx, stop_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl-C, stopping after the current visit");
            tracing::warn!("Press Ctrl-C again to force quit");
            let _ = stop_tx.send(true);

            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Force quit requested, exiting immediately");
                std::process::exit(1);
            }
        }
    });

    stop_rx
}

/// Handles the main crawl operation
///
/// On Ctrl-C the crawl finishes its current visit and the state is written
/// to the snapshot directory instead of the records file.
async fn handle_crawl(config: Config, config_hash: String) -> anyhow::Result<()> {
    let mut crawler = build_crawler(&config).context("Failed to build crawler")?;
    tracing::info!("Starting crawl from {}", config.crawler.seed);

    let stop = setup_shutdown_handler();
    let stats = crawler.run_until(stop).await.map_err(|e| {
        tracing::error!("Crawl failed: {}", e);
        e
    })?;

    if crawler.was_stopped() {
        tracing::warn!("Interrupted, writing snapshot");

        let dir = Path::new(&config.output.snapshot_dir);
        let snapshot = crawler.snapshot().with_config_hash(config_hash);
        write_snapshot(dir, &snapshot, crawler.collected())
            .with_context(|| format!("Failed to write snapshot to {}", dir.display()))?;

        println!("INTERRUPTED");
    } else {
        let path = Path::new(&config.output.records_path);
        let written = write_records(path, crawler.collected())
            .with_context(|| format!("Failed to write records to {}", path.display()))?;
        tracing::info!("Wrote {} records to {}", written, path.display());

        println!("DONE");
    }
    print_statistics(&stats);

    Ok(())
}
