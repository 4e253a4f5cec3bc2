//! Partition command: split the master manifest into per-template
//! sub-manifests

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::manifest::{self, Partitioner};

pub fn execute(config: &Config) -> Result<()> {
    info!(master = %config.manifests.master.display(), "Starting partition");

    let entries = manifest::load(&config.manifests.master)
        .with_context(|| format!("loading {}", config.manifests.master.display()))?;

    let partitioned = Partitioner::new(config.pipeline.limit).partition(&entries);

    manifest::save(&config.manifests.month_block, &partitioned.month_block)?;
    manifest::save(&config.manifests.event_popup, &partitioned.event_popup)?;
    manifest::save(&config.manifests.day_block, &partitioned.day_block)?;
    manifest::save(&config.manifests.other, &partitioned.other)?;

    let stats = &partitioned.stats;
    println!("\n=== Partition Summary ===");
    println!("Entries examined:  {}", stats.total);
    println!("  month_block:     {}", stats.month_block);
    println!("  event_popup:     {}", stats.event_popup);
    println!("  day_block:       {}", stats.day_block);
    println!("  other:           {}", stats.other);
    println!("Skipped (missing): {}", stats.skipped_missing);
    println!("Skipped (empty):   {}", stats.skipped_empty);
    println!("=========================\n");

    Ok(())
}
