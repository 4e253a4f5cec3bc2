//! Run command: the full pipeline, partition through analytics

use anyhow::Result;
use tracing::info;

use crate::commands::{analyze, extract, partition};
use crate::config::Config;

pub fn execute(config: &Config) -> Result<()> {
    info!("Starting full pipeline run");
    partition::execute(config)?;
    extract::execute(config)?;
    analyze::execute(config)?;
    info!("Pipeline run complete");
    Ok(())
}
