//! Analyze command: aggregate the persisted canonical table into report
//! artifacts

use anyhow::{Context, Result};
use tracing::info;

use crate::analytics;
use crate::config::Config;
use crate::models::CanonicalTable;
use crate::storage;

pub fn execute(config: &Config) -> Result<()> {
    let events_path = config.output.events_path();
    let bookings_path = config.output.bookings_path();

    let events = storage::load_events(&events_path)
        .with_context(|| format!("loading {}", events_path.display()))?;
    let bookings = storage::load_bookings(&bookings_path)
        .with_context(|| format!("loading {}", bookings_path.display()))?;
    info!(events = events.len(), bookings = bookings.len(), "Loaded canonical table");

    let table = CanonicalTable { events, bookings };
    let report = analytics::aggregate(&table);
    let written = storage::write_report(&config.output.report_dir(), &report)?;

    println!("\n=== Analytics Summary ===");
    println!("Years summarized:  {}", report.yearly.len());
    for year in &report.yearly {
        let growth = year
            .growth_pct
            .map(|p| format!("{p:+.1}%"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {}: {} events, {} months, growth {}",
            year.year, year.events, year.months, growth
        );
    }
    println!("Artifacts written: {}", written.len());
    println!("Report directory:  {}", config.output.report_dir().display());
    println!("=========================\n");

    Ok(())
}
