//! Site-Scribe main entry point
//!
//! This is the command-line interface for the Site-Scribe text harvester.

use anyhow::{bail, Context};
use clap::Parser;
use site_scribe::annotate::{Annotator, NullAnnotator, OpenAiAnnotator, OpenAiSettings};
use site_scribe::config::{load_config, Config, API_KEY_ENV};
use site_scribe::crawler::run_crawl;
use site_scribe::extract_authority;
use site_scribe::output::print_statistics;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Site-Scribe: a single-domain text harvester
///
/// Site-Scribe crawls one website from a seed URL, extracts the text of
/// every HTML page and PDF it finds, annotates it with bilingual keywords
/// and summaries, and writes one text file per page.
#[derive(Parser, Debug)]
#[command(name = "site-scribe")]
#[command(version = "1.0.0")]
#[command(about = "A single-domain text harvester", long_about = None)]
struct Cli {
    /// Path to TOML or JSON configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Crawl without calling the annotation model; every page gets an empty header
    #[arg(long)]
    skip_annotation: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    setup_logging(cli.verbose, cli.quiet, config.log_path())?;
    tracing::info!("Configuration loaded from: {}", cli.config.display());

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(config, cli.skip_annotation).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// When a log file is configured, events are also appended to it without
/// ANSI colors.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&str>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_scribe=info,warn"),
            1 => EnvFilter::new("site_scribe=debug,info"),
            2 => EnvFilter::new("site_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(Path::new(path))
                .with_context(|| format!("Failed to open log file {}", path))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false).with_file(false))
        .with(file_layer)
        .init();

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let authority = extract_authority(&config.start_url)?;
    let output_dir = Path::new(&config.output_directory).join(&authority);

    println!("=== Site-Scribe Dry Run ===\n");

    println!("Crawl:");
    println!("  Start URL: {}", config.start_url);
    println!("  Domain: {}", authority);
    println!("  Page budget: {}", config.max_pages);
    println!("  Delay between pages: {}s", config.delay_between_requests);
    println!("  Request timeout: {}s", config.request_timeout_secs);
    println!("  User agent: {}", config.user_agent);

    println!("\nExcluded link patterns ({}):", config.excluded_link_patterns.len());
    for pattern in &config.excluded_link_patterns {
        println!("  - {}", pattern);
    }

    println!("\nAnnotation:");
    println!("  Endpoint: {}", config.openai_base_url);
    println!("  Model: {}", config.openai_model);
    println!("  Max tokens: {}", config.openai_max_tokens);
    println!("  Temperature: {}", config.openai_temperature);
    println!(
        "  API key ({}): {}",
        API_KEY_ENV,
        if std::env::var(API_KEY_ENV).is_ok() { "set" } else { "missing" }
    );

    println!("\nOutput:");
    println!("  Directory: {}", output_dir.display());
    if let Some(log) = config.log_path() {
        println!("  Log file: {}", log);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Builds the annotator for this run
fn build_annotator(config: &Config, skip_annotation: bool) -> anyhow::Result<Box<dyn Annotator>> {
    if skip_annotation {
        tracing::info!("Annotation disabled, pages get an empty header");
        return Ok(Box::new(NullAnnotator));
    }

    let api_key = match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => bail!(
            "{} is not set; export it or pass --skip-annotation",
            API_KEY_ENV
        ),
    };

    let annotator = OpenAiAnnotator::new(&api_key, OpenAiSettings::from_config(config))
        .context("Failed to set up the annotation client")?;
    Ok(Box::new(annotator))
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, skip_annotation: bool) -> anyhow::Result<()> {
    let annotator = build_annotator(&config, skip_annotation)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing the current page");
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }

    tracing::info!(
        "Crawling {} into {} (up to {} pages)",
        config.start_url,
        config.output_directory,
        config.max_pages
    );

    match run_crawl(config, annotator, Some(shutdown)).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
