//! Link-Harvest main entry point
//!
//! This is the command-line interface for the Link-Harvest two-pass harvester.

use anyhow::Context;
use clap::Parser;
use link_harvest::config::{load_config_with_hash, Config};
use link_harvest::crawler::{harvest, Limiter};
use link_harvest::output::{print_summary, RunSummary};
use link_harvest::tabular::{load_seeds, save_results};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Link-Harvest: a two-pass link harvester
///
/// Link-Harvest fetches every seed page concurrently, extracts one kind of
/// link from each, then visits each unique link at a polite pace to extract
/// a second set of links, which it writes to the output file.
#[derive(Parser, Debug)]
#[command(name = "link-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A two-pass link harvester", long_about = None)]
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

    /// Seed file to read instead of the configured one
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Result file to write instead of the configured one
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Load config and seeds and show what would be harvested, without any network access
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let input = cli
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.input.path));
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.path));

    // Structural failure: nothing touches the network before seeds load
    let seeds = load_seeds(&input, config.input.column, config.input.has_headers)
        .with_context(|| format!("Failed to load seeds from {}", input.display()))?;
    tracing::info!("Loaded {} seeds from {}", seeds.len(), input.display());

    if cli.dry_run {
        handle_dry_run(&config, &seeds, &input, &output);
        return Ok(());
    }

    handle_harvest(&config, seeds, &output, config_hash, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_harvest=info,warn"),
            1 => EnvFilter::new("link_harvest=debug,info"),
            2 => EnvFilter::new("link_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config, seeds: &[String], input: &Path, output: &Path) {
    println!("=== Link-Harvest Dry Run ===\n");

    println!("First Pass:");
    println!("  Selector: {}", config.first_pass.selector);
    println!("  Attribute: {}", config.first_pass.attribute);
    match config.first_pass.max_concurrent_fetches {
        Some(limit) => println!("  Max concurrent fetches: {}", limit),
        None => println!("  Max concurrent fetches: unbounded"),
    }

    println!("\nSecond Pass:");
    println!("  Base domain: {}", config.second_pass.base_domain);
    println!("  Selector: {}", config.second_pass.selector);
    println!("  Attribute: {}", config.second_pass.attribute);
    let limiter = Limiter::from_config(config.second_pass.rate_limit, config.second_pass.delay_ms);
    println!("  Rate limit: {}", limiter.describe());
    if config.second_pass.accumulate {
        println!("  Results: accumulated across all unique links");
    } else {
        println!("  Results: only the last unique link's results are kept");
    }

    println!("\nFiles:");
    println!("  Input: {} (column {})", input.display(), config.input.column);
    println!("  Output: {}", output.display());

    println!("\nSeeds ({}):", seeds.len());
    for seed in seeds {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &Config,
    seeds: Vec<String>,
    output: &Path,
    config_hash: String,
    quiet: bool,
) -> anyhow::Result<()> {
    let started_at = chrono::Utc::now();

    if !config.second_pass.accumulate {
        tracing::warn!(
            "Only the last unique link's second-pass results will be saved; set accumulate = true to keep all of them"
        );
    }

    let outcome = harvest(config, seeds).await.context("Harvest failed")?;

    save_results(output, outcome.results())
        .with_context(|| format!("Failed to save results to {}", output.display()))?;
    tracing::info!(
        "Saved {} results to {}",
        outcome.results().len(),
        output.display()
    );

    if !quiet {
        let summary = RunSummary::new(started_at, chrono::Utc::now(), config_hash, &outcome);
        print_summary(&summary);
    }

    Ok(())
}
