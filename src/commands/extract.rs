//! Extract command: parse the partitioned snapshots and build the canonical
//! event table

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ParseError;
use crate::manifest::{self, query_params};
use crate::models::{ManifestEntry, PopupDetail, RawEventRecord, SourceType};
use crate::parser::{GridParser, PopupParser};
use crate::reconcile::{AliasTable, Reconciler};
use crate::storage;

pub fn execute(config: &Config) -> Result<()> {
    info!("Starting extraction");

    let month_entries = manifest::load(&config.manifests.month_block)
        .with_context(|| format!("loading {}", config.manifests.month_block.display()))?;
    let day_entries = manifest::load(&config.manifests.day_block)
        .with_context(|| format!("loading {}", config.manifests.day_block.display()))?;
    let popup_entries = manifest::load(&config.manifests.event_popup)
        .with_context(|| format!("loading {}", config.manifests.event_popup.display()))?;

    let month_records = grid_records(&month_entries, SourceType::MonthBlock);
    let day_records = grid_records(&day_entries, SourceType::DayBlock);
    let popups = popup_details(&popup_entries);

    let aliases = match &config.pipeline.alias_file {
        Some(path) => AliasTable::from_file(path)
            .with_context(|| format!("loading aliases from {}", path.display()))?,
        None => AliasTable::default(),
    };

    let reconciler = Reconciler::new(
        config.pipeline.calendar_name.clone(),
        config.pipeline.coverage_gate,
        aliases,
    );
    let (table, stats) = reconciler.reconcile(month_records, day_records, popups);

    let events_path = config.output.events_path();
    let bookings_path = config.output.bookings_path();
    storage::write_table(&events_path, &bookings_path, &table)?;

    println!("\n=== Extraction Summary ===");
    println!("Candidates:        {}", stats.candidates);
    println!("Dropped (cal):     {}", stats.dropped_calendar);
    println!("Dropped (no date): {}", stats.dropped_dateless);
    println!("Gated day records: {}", stats.gated_day_records);
    println!("Dedup removed:     {}", stats.dedup_removed);
    println!("Canonical events:  {}", stats.events);
    println!("Venue bookings:    {}", stats.bookings);
    println!("Events table:      {}", events_path.display());
    println!("Bookings table:    {}", bookings_path.display());
    println!("==========================\n");

    Ok(())
}

fn grid_records(entries: &[ManifestEntry], source: SourceType) -> Vec<RawEventRecord> {
    let mut records = Vec::new();
    for entry in entries {
        let Some(html) = read_snapshot(entry) else {
            continue;
        };
        let params = query_params(&entry.original);
        let calendar_name = params.get("CalendarName").map(String::as_str);
        records.extend(GridParser::parse(&html, calendar_name, source));
    }
    info!(count = records.len(), source = %source, "Parsed grid snapshots");
    records
}

fn popup_details(entries: &[ManifestEntry]) -> Vec<PopupDetail> {
    let mut details = Vec::new();
    for entry in entries {
        let Some(html) = read_snapshot(entry) else {
            continue;
        };
        if let Some(detail) = PopupParser::parse(&html, &entry.original) {
            details.push(detail);
        }
    }
    info!(count = details.len(), "Parsed popup snapshots");
    details
}

fn read_snapshot(entry: &ManifestEntry) -> Option<String> {
    let path = entry.path.as_deref()?;
    match std::fs::read(Path::new(path)) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(_) => {
            let err = ParseError::UnreadableSnapshot(PathBuf::from(path));
            warn!(error = %err, "Skipping snapshot");
            None
        }
    }
}
