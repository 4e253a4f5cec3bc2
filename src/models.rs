//! Core data structures for the almanac pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One archived capture from the downloader's manifest.
///
/// Immutable once written by the downloader; the pipeline only reads these.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ManifestEntry {
    /// Archive capture time (provenance/ordering only)
    pub timestamp: String,

    /// Live-site URL at capture time; query parameters encode the page type
    pub original: String,

    /// Archive snapshot URL, when the downloader recorded it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_url: Option<String>,

    /// Local path of the stored HTML; absent or empty on download failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Download error message, when the capture failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ManifestEntry {
    /// Whether the entry points at an existing, non-empty local file
    pub fn has_file(&self) -> bool {
        match self.path.as_deref() {
            Some(p) if !p.is_empty() => {
                let path = Path::new(p);
                std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
            }
            _ => false,
        }
    }
}

/// Which grid template a raw record was parsed from.
///
/// Month views are authoritative; day views only fill months the archive
/// never captured at month granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    MonthBlock,
    DayBlock,
}

impl SourceType {
    /// Dedup priority: lower ranks win ties
    pub fn rank(&self) -> u8 {
        match self {
            Self::MonthBlock => 0,
            Self::DayBlock => 1,
        }
    }

    /// Get string representation (matches the persisted `source_type` column)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonthBlock => "month_block",
            Self::DayBlock => "day_block",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month_block" => Some(Self::MonthBlock),
            "day_block" => Some(Self::DayBlock),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw event record extracted from a single snapshot.
///
/// Ephemeral: produced per-parse, consumed by the reconciler, never persisted
/// standalone. `date` may be absent (the reconciler drops such records since
/// date is part of the identity key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEventRecord {
    /// YYYY-MM-DD, or absent when unparseable
    pub date: Option<String>,

    /// Display title text
    pub title: String,

    /// Lowercased, punctuation-stripped, whitespace-collapsed title used for
    /// identity comparisons
    pub title_norm: String,

    /// Free-text time string, e.g. "1:00 PM"
    pub time_label: Option<String>,

    /// Short venue code with the `c_` prefix stripped
    pub location_code: Option<String>,

    /// Named calendar feed the page belongs to, from URL query parameters
    pub calendar_name: Option<String>,

    /// Opaque identifier recovered from popup-link parameters, when present
    pub event_id: Option<String>,

    /// Which grid template produced this record
    pub source: SourceType,
}

impl RawEventRecord {
    /// YYYY-MM prefix of the date, when a date is present
    pub fn year_month(&self) -> Option<&str> {
        self.date.as_deref().and_then(|d| d.get(..7))
    }

    /// YYYY prefix of the date, when a date is present
    pub fn year(&self) -> Option<&str> {
        self.date.as_deref().and_then(|d| d.get(..4))
    }

    /// Composite dedup rank: source priority, then event_id presence, then
    /// location presence. Lower wins.
    pub fn dedup_rank(&self) -> (u8, u8, u8) {
        (
            self.source.rank(),
            u8::from(self.event_id.is_none()),
            u8::from(self.location_code.is_none()),
        )
    }
}

/// Detail parsed from an event popup page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupDetail {
    /// Event identifier from the source URL's query parameters
    pub event_id: Option<String>,

    /// Event summary text
    pub summary: String,

    /// Date header text, when the page carries one
    pub date_header: Option<String>,
}

/// One row of the persisted canonical event table.
///
/// Column names here are a contract with the downstream report renderer;
/// renaming any of them is a breaking change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Unified identity key: `date||title_canonical||time_label`
    pub event_key: String,

    pub date: String,
    pub title: String,
    pub title_canonical: String,
    pub time_label: Option<String>,
    pub location_code: Option<String>,
    pub calendar_name: Option<String>,
    pub event_id: Option<String>,
    pub source_type: String,
    pub year: String,
    pub year_month: String,

    /// Popup enrichment; absent when no popup matched, which is never an error
    pub popup_summary: Option<String>,
    pub popup_date_header: Option<String>,
}

/// One (event, venue) usage pair.
///
/// An event using three venues yields three bookings but counts as one event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VenueBooking {
    pub event_key: String,
    pub location_code: String,
}

/// The deduplicated canonical output of reconciliation.
///
/// Invariants: `event_key` is unique across `events`; `(event_key,
/// location_code)` is unique across `bookings` and `location_code` is never
/// empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanonicalTable {
    pub events: Vec<CanonicalEvent>,
    pub bookings: Vec<VenueBooking>,
}

/// Counters from one partitioning run over the full manifest
#[derive(Debug, Clone, Default, Serialize)]
pub struct PartitionStats {
    pub total: usize,
    pub month_block: usize,
    pub event_popup: usize,
    pub day_block: usize,
    pub other: usize,
    pub skipped_missing: usize,
    pub skipped_empty: usize,
}

impl PartitionStats {
    /// Entries that were routed to any bucket
    pub fn routed(&self) -> usize {
        self.month_block + self.event_popup + self.day_block + self.other
    }
}
