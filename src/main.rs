//! Restaurant-Harvester main entry point
//!
//! This is the command-line interface for the Restaurant-Harvester scraper.

use anyhow::Context;
use clap::Parser;
use restaurant_harvester::config::{load_config, validate, Config};
use restaurant_harvester::crawler::{Coordinator, HarvestOptions};
use restaurant_harvester::output::{print_summary, write_restaurants};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Restaurant-Harvester: a paginated restaurant directory scraper
///
/// Walks every listing page of the directory, collects restaurant detail
/// pages, and writes the metadata embedded in each one to a JSON file.
#[derive(Parser, Debug)]
#[command(name = "restaurant-harvester")]
#[command(version)]
#[command(about = "Harvest restaurant metadata into a JSON document", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after discovering this many restaurant URLs
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Number of restaurant detail pages fetched in parallel [default: 2]
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Where to write the JSON document [default: data/restaurants.json]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let options = HarvestOptions::from(&config.harvester);
    let output_path = PathBuf::from(&config.output.path);

    let coordinator =
        Coordinator::from_config(&config).context("Failed to set up the harvester")?;

    let harvest = coordinator.run(&options).await.context("Harvest failed")?;

    tracing::info!(
        "Writing {} restaurant(s) to {}",
        harvest.records.len(),
        output_path.display()
    );
    write_restaurants(&harvest.records, &output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if !cli.quiet {
        print_summary(&harvest, &output_path);
    }

    Ok(())
}

/// Loads the configuration file (if any) and applies CLI overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(limit) = cli.limit {
        config.harvester.limit = Some(limit);
    }
    if let Some(concurrency) = cli.concurrency {
        config.harvester.concurrency = concurrency;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.to_string_lossy().into_owned();
    }

    validate(&config).context("Invalid command-line options")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("restaurant_harvester=info,warn"),
            1 => EnvFilter::new("restaurant_harvester=debug,info"),
            2 => EnvFilter::new("restaurant_harvester=trace,debug"),
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
