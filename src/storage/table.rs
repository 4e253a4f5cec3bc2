//! CSV persistence for the canonical event table
//!
//! Two artifacts: `events.csv` (one row per canonical event) and
//! `venue_bookings.csv` (one row per event-venue pair). Columns are matched
//! by header name on load, so downstream tools may append columns without
//! breaking the pipeline; a missing identity column is fatal.
//!
//! Fields never contain raw newlines (all text passes through whitespace
//! collapsing before it gets here), so parsing is line-based.

use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{CanonicalEvent, CanonicalTable, VenueBooking};

const EVENT_COLUMNS: [&str; 13] = [
    "date",
    "title",
    "title_canonical",
    "time_label",
    "location_code",
    "calendar_name",
    "event_id",
    "source_type",
    "year",
    "year_month",
    "popup_summary",
    "popup_date_header",
    "event_key",
];

const BOOKING_COLUMNS: [&str; 2] = ["event_key", "location_code"];

/// Quote a field when it contains a delimiter, quote, or newline
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }
    fields.push(field);
    fields
}

fn write_rows(path: &Path, header: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut out = String::new();
    out.push_str(&header.join(","));
    out.push('\n');
    for row in rows {
        let escaped: Vec<String> = row.iter().map(|f| csv_escape(f)).collect();
        out.push_str(&escaped.join(","));
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Header-name to index mapping, validated against the columns a reader
/// cannot do without.
struct Columns {
    names: Vec<String>,
}

impl Columns {
    fn parse(path: &Path, header_line: &str, required: &[&str]) -> Result<Self> {
        let names = parse_csv_line(header_line);
        for want in required {
            if !names.iter().any(|n| n == want) {
                return Err(Error::config(format!(
                    "{} is missing required column '{want}'",
                    path.display()
                )));
            }
        }
        Ok(Self { names })
    }
}

struct Row<'a> {
    columns: &'a Columns,
    fields: Vec<String>,
}

impl Row<'_> {
    fn get(&self, name: &str) -> String {
        self.columns
            .names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.fields.get(i))
            .cloned()
            .unwrap_or_default()
    }

    fn get_opt(&self, name: &str) -> Option<String> {
        let value = self.get(name);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Persist the events half of a canonical table.
pub fn write_events(path: &Path, events: &[CanonicalEvent]) -> Result<()> {
    let rows = events
        .iter()
        .map(|e| {
            vec![
                e.date.clone(),
                e.title.clone(),
                e.title_canonical.clone(),
                e.time_label.clone().unwrap_or_default(),
                e.location_code.clone().unwrap_or_default(),
                e.calendar_name.clone().unwrap_or_default(),
                e.event_id.clone().unwrap_or_default(),
                e.source_type.clone(),
                e.year.clone(),
                e.year_month.clone(),
                e.popup_summary.clone().unwrap_or_default(),
                e.popup_date_header.clone().unwrap_or_default(),
                e.event_key.clone(),
            ]
        })
        .collect();
    write_rows(path, &EVENT_COLUMNS, rows)
}

/// Persist the bookings half of a canonical table.
pub fn write_bookings(path: &Path, bookings: &[VenueBooking]) -> Result<()> {
    let rows = bookings
        .iter()
        .map(|b| vec![b.event_key.clone(), b.location_code.clone()])
        .collect();
    write_rows(path, &BOOKING_COLUMNS, rows)
}

/// Load persisted events. Unknown extra columns are ignored; a file without
/// the `date` or `event_key` column is rejected.
pub fn load_events(path: &Path) -> Result<Vec<CanonicalEvent>> {
    let content = std::fs::read_to_string(path)?;
    let mut lines = content.lines();
    let header = lines
        .next()
        .ok_or_else(|| Error::config(format!("{} is empty", path.display())))?;
    let columns = Columns::parse(path, header, &["date", "event_key"])?;

    let mut events = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let row = Row {
            columns: &columns,
            fields: parse_csv_line(line),
        };
        events.push(CanonicalEvent {
            event_key: row.get("event_key"),
            date: row.get("date"),
            title: row.get("title"),
            title_canonical: row.get("title_canonical"),
            time_label: row.get_opt("time_label"),
            location_code: row.get_opt("location_code"),
            calendar_name: row.get_opt("calendar_name"),
            event_id: row.get_opt("event_id"),
            source_type: row.get("source_type"),
            year: row.get("year"),
            year_month: row.get("year_month"),
            popup_summary: row.get_opt("popup_summary"),
            popup_date_header: row.get_opt("popup_date_header"),
        });
    }
    Ok(events)
}

/// Load persisted bookings.
pub fn load_bookings(path: &Path) -> Result<Vec<VenueBooking>> {
    let content = std::fs::read_to_string(path)?;
    let mut lines = content.lines();
    let header = lines
        .next()
        .ok_or_else(|| Error::config(format!("{} is empty", path.display())))?;
    let columns = Columns::parse(path, header, &BOOKING_COLUMNS)?;

    let mut bookings = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let row = Row {
            columns: &columns,
            fields: parse_csv_line(line),
        };
        bookings.push(VenueBooking {
            event_key: row.get("event_key"),
            location_code: row.get("location_code"),
        });
    }
    Ok(bookings)
}

/// Persist both halves of a canonical table next to each other.
pub fn write_table(events_path: &Path, bookings_path: &Path, table: &CanonicalTable) -> Result<()> {
    write_events(events_path, &table.events)?;
    write_bookings(bookings_path, &table.bookings)
}
