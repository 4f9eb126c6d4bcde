//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror crawler.

use anyhow::Context;
use clap::Parser;
use site_mirror::config::{load_config_with_hash, validate, Config};
use site_mirror::crawler::run_crawl;
use site_mirror::output::print_statistics;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: mirror one website onto local disk
///
/// Site-Mirror walks a site depth-first from a start page and saves every
/// page, script, stylesheet and image it reaches, keeping the site's path
/// layout. URLs that could not be downloaded are listed in a report.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "Mirror a single website onto local disk", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Page to start crawling from, overriding the configuration
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Directory to mirror into, overriding the configuration
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

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
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(url) = cli.url {
        config.crawler.start_url = url;
    }
    if let Some(output) = cli.output {
        config.output.root_dir = output.to_string_lossy().into_owned();
    }

    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mirror=info,warn"),
            1 => EnvFilter::new("site_mirror=debug,info"),
            2 => EnvFilter::new("site_mirror=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Site-Mirror Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!(
        "  Connect timeout: {}s",
        config.crawler.connect_timeout_secs
    );

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Root: {}", config.output.root_dir);
    println!("  Failure report: {}", config.output.failure_report);

    println!("\nLink Scope:");
    println!("  Always follow inside: {}", config.scope.sidebar);
    println!("  Never follow inside: {}", config.scope.main_content);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would mirror into {} (existing contents are deleted)",
        config.output.root_dir
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let signal_task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, stopping after the current request");
                cancel.cancel();
            }
        }
    });

    let result = run_crawl(&config, cancel).await;
    signal_task.abort();

    let report = result.context("Crawl failed")?;
    let elapsed = report.statistics.elapsed;

    match &report.failure_report {
        Some(path) => {
            tracing::warn!("Completed with errors in {:?}", elapsed);
            tracing::warn!("Please check: {}", path.display());
        }
        None if report.cancelled => tracing::info!("Stopped after {:?}", elapsed),
        None => tracing::info!("Completed in {:?}", elapsed),
    }

    print_statistics(&report.statistics);

    Ok(())
}
