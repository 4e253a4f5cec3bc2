//! almanac CLI entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use almanac::commands;
use almanac::config::Config;

#[derive(Parser)]
#[command(name = "almanac")]
#[command(version, about = "Calendar archive mining pipeline", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format (pretty or json), overriding the config file
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the master manifest into per-template sub-manifests
    Partition {
        /// Cap on manifest entries examined, for sampling runs
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Parse partitioned snapshots and build the canonical event table
    Extract,

    /// Aggregate the canonical table into yearly report artifacts
    Analyze,

    /// Run the full pipeline: partition, extract, analyze
    Run,
}

fn setup_tracing(format: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("almanac=debug,info")
        } else {
            EnvFilter::new("almanac=info,warn")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
        config.validate()?;
    }

    setup_tracing(&config.logging.format, cli.verbose);

    match cli.command {
        Commands::Partition { limit } => {
            if limit.is_some() {
                config.pipeline.limit = limit;
                config.validate()?;
            }
            commands::partition::execute(&config)
        }
        Commands::Extract => commands::extract::execute(&config),
        Commands::Analyze => commands::analyze::execute(&config),
        Commands::Run => commands::run::execute(&config),
    }
}
