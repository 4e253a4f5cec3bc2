//! Reconciliation of raw records into the canonical event table
//!
//! Month grids are authoritative. Day grids only contribute for months the
//! archive never captured at month granularity, which keeps one archive of
//! overlapping captures from inflating event counts. After gating, records
//! are deduplicated in two passes (by event id, then by normalized title)
//! and finally collapsed onto the unified identity key.
//!
//! Venue bookings are collected from every gated candidate rather than just
//! dedup survivors: duplicates of one event routinely carry different venue
//! codes, and each distinct venue is a real booking.

pub mod canonical;

pub use canonical::{canonical_location, canonical_title, event_key, AliasTable};

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{
    CanonicalEvent, CanonicalTable, PopupDetail, RawEventRecord, VenueBooking,
};

/// Reconciliation statistics for one run
#[derive(Debug, Clone, Default)]
pub struct ReconcileStats {
    pub candidates: usize,
    pub dropped_calendar: usize,
    pub dropped_dateless: usize,
    pub gated_day_records: usize,
    pub dedup_removed: usize,
    pub events: usize,
    pub bookings: usize,
}

/// Builds the canonical event table from raw grid records and popup details
#[derive(Debug, Clone)]
pub struct Reconciler {
    calendar_name: Option<String>,
    coverage_gate: bool,
    aliases: AliasTable,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            calendar_name: None,
            coverage_gate: true,
            aliases: AliasTable::default(),
        }
    }
}

impl Reconciler {
    pub fn new(calendar_name: Option<String>, coverage_gate: bool, aliases: AliasTable) -> Self {
        Self {
            calendar_name,
            coverage_gate,
            aliases,
        }
    }

    /// Reconcile raw records into the canonical table.
    ///
    /// Pure over its inputs; reconciling the same records twice produces the
    /// same table.
    pub fn reconcile(
        &self,
        month_records: Vec<RawEventRecord>,
        day_records: Vec<RawEventRecord>,
        popups: Vec<PopupDetail>,
    ) -> (CanonicalTable, ReconcileStats) {
        let mut stats = ReconcileStats::default();

        let month_records = self.filter_records(month_records, &mut stats);
        let day_records = self.filter_records(day_records, &mut stats);

        // Months already covered by an authoritative month capture
        let covered_months: HashSet<String> = month_records
            .iter()
            .filter_map(|r| r.year_month().map(str::to_string))
            .collect();

        let mut candidates = month_records;
        for record in day_records {
            let covered = record
                .year_month()
                .map(|ym| covered_months.contains(ym))
                .unwrap_or(false);
            if self.coverage_gate && covered {
                stats.gated_day_records += 1;
            } else {
                candidates.push(record);
            }
        }
        stats.candidates = candidates.len();

        // Stable order so ties always resolve the same way: month beats day,
        // id-bearing beats id-less, venue-bearing beats venue-less.
        candidates.sort_by(|a, b| {
            (a.date.as_deref(), &a.title_norm, a.dedup_rank())
                .cmp(&(b.date.as_deref(), &b.title_norm, b.dedup_rank()))
        });

        let survivors = self.dedup(&candidates, &mut stats);
        let events = self.collapse(survivors, &popups);
        let bookings = self.bookings(&candidates, &events);

        stats.events = events.len();
        stats.bookings = bookings.len();

        tracing::info!(
            candidates = stats.candidates,
            dropped_dateless = stats.dropped_dateless,
            gated_day_records = stats.gated_day_records,
            dedup_removed = stats.dedup_removed,
            events = stats.events,
            bookings = stats.bookings,
            "Reconciliation complete"
        );

        (CanonicalTable { events, bookings }, stats)
    }

    /// Calendar filter plus the dateless drop. Snapshots without a calendar
    /// parameter belong to the default calendar and pass the filter.
    fn filter_records(
        &self,
        records: Vec<RawEventRecord>,
        stats: &mut ReconcileStats,
    ) -> Vec<RawEventRecord> {
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if let Some(want) = self.calendar_name.as_deref() {
                match record.calendar_name.as_deref() {
                    Some(name) if name != want => {
                        stats.dropped_calendar += 1;
                        continue;
                    }
                    _ => {}
                }
            }
            if record.date.is_none() {
                stats.dropped_dateless += 1;
                tracing::debug!(title = %record.title, "Dropping dateless record");
                continue;
            }
            kept.push(record);
        }
        kept
    }

    /// Two-bucket dedup over date-sorted candidates. Records carrying an
    /// event id are unique per (date, id); id-less records are unique per
    /// (date, normalized title). The buckets are independent: an id-less
    /// record survives its own pass even when an id-bearing record shares
    /// its date and title, and true echoes of one event are absorbed later
    /// by the unified-key collapse.
    fn dedup<'a>(
        &self,
        candidates: &'a [RawEventRecord],
        stats: &mut ReconcileStats,
    ) -> Vec<&'a RawEventRecord> {
        let mut seen_id: HashSet<(&str, &str)> = HashSet::new();
        let mut seen_title: HashSet<(&str, &str)> = HashSet::new();
        let mut survivors = Vec::new();

        for record in candidates {
            // filter_records dropped dateless candidates already
            let Some(date) = record.date.as_deref() else {
                continue;
            };

            match record.event_id.as_deref() {
                Some(id) => {
                    if !seen_id.insert((date, id)) {
                        stats.dedup_removed += 1;
                        continue;
                    }
                }
                None => {
                    if !seen_title.insert((date, record.title_norm.as_str())) {
                        stats.dedup_removed += 1;
                        continue;
                    }
                }
            }
            survivors.push(record);
        }
        survivors
    }

    /// Collapse survivors onto the unified identity key; the first survivor
    /// per key (the best-ranked one, given the sort) defines the event.
    fn collapse(
        &self,
        survivors: Vec<&RawEventRecord>,
        popups: &[PopupDetail],
    ) -> Vec<CanonicalEvent> {
        let popup_by_id: HashMap<&str, &PopupDetail> = popups
            .iter()
            .filter_map(|p| p.event_id.as_deref().map(|id| (id, p)))
            .fold(HashMap::new(), |mut map, (id, p)| {
                map.entry(id).or_insert(p);
                map
            });

        let mut seen_keys: HashSet<String> = HashSet::new();
        let mut events = Vec::new();

        for record in survivors {
            let date = record.date.as_deref().unwrap_or_default();
            let title_canonical = canonical_title(&record.title, &self.aliases);
            let key = event_key(date, &title_canonical, record.time_label.as_deref());
            if !seen_keys.insert(key.clone()) {
                continue;
            }

            let popup = record
                .event_id
                .as_deref()
                .and_then(|id| popup_by_id.get(id));

            events.push(CanonicalEvent {
                event_key: key,
                date: date.to_string(),
                title: record.title.clone(),
                title_canonical,
                time_label: record.time_label.clone(),
                location_code: record
                    .location_code
                    .as_deref()
                    .map(canonical_location)
                    .filter(|l| !l.is_empty()),
                calendar_name: record.calendar_name.clone(),
                event_id: record.event_id.clone(),
                source_type: record.source.as_str().to_string(),
                year: record.year().unwrap_or_default().to_string(),
                year_month: record.year_month().unwrap_or_default().to_string(),
                popup_summary: popup.map(|p| p.summary.clone()),
                popup_date_header: popup.and_then(|p| p.date_header.clone()),
            });
        }
        events
    }

    /// Venue bookings come from every gated candidate, not just survivors,
    /// restricted to keys that exist in the event table.
    fn bookings(
        &self,
        candidates: &[RawEventRecord],
        events: &[CanonicalEvent],
    ) -> Vec<VenueBooking> {
        let known_keys: HashSet<&str> = events.iter().map(|e| e.event_key.as_str()).collect();

        let unique: BTreeSet<VenueBooking> = candidates
            .iter()
            .filter_map(|record| {
                let date = record.date.as_deref()?;
                let location = canonical_location(record.location_code.as_deref()?);
                if location.is_empty() {
                    return None;
                }
                let title_canonical = canonical_title(&record.title, &self.aliases);
                let key = event_key(date, &title_canonical, record.time_label.as_deref());
                known_keys.contains(key.as_str()).then_some(VenueBooking {
                    event_key: key,
                    location_code: location,
                })
            })
            .collect();

        unique.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceType;

    fn record(
        date: &str,
        title: &str,
        time: Option<&str>,
        location: Option<&str>,
        id: Option<&str>,
        source: SourceType,
    ) -> RawEventRecord {
        RawEventRecord {
            date: Some(date.to_string()),
            title: title.to_string(),
            title_norm: crate::parser::text::normalize_title(title),
            time_label: time.map(str::to_string),
            location_code: location.map(str::to_string),
            calendar_name: None,
            event_id: id.map(str::to_string),
            source,
        }
    }

    #[test]
    fn test_month_beats_day_for_same_id() {
        let month = vec![record(
            "2021-05-21",
            "Friday Prayer",
            Some("1:00 PM"),
            Some("Masjid"),
            Some("899"),
            SourceType::MonthBlock,
        )];
        // Same month is covered, so this day record is gated out entirely
        let day = vec![record(
            "2021-05-21",
            "Friday Prayer",
            Some("1:00 PM"),
            Some("Masjid"),
            Some("899"),
            SourceType::DayBlock,
        )];

        let (table, stats) = Reconciler::default().reconcile(month, day, vec![]);
        assert_eq!(table.events.len(), 1);
        assert_eq!(table.events[0].source_type, "month_block");
        assert_eq!(stats.gated_day_records, 1);
    }

    #[test]
    fn test_gate_disabled_still_dedups_by_id() {
        let month = vec![record(
            "2021-05-21",
            "Friday Prayer",
            None,
            None,
            Some("899"),
            SourceType::MonthBlock,
        )];
        let day = vec![record(
            "2021-05-21",
            "Friday Prayer",
            None,
            None,
            Some("899"),
            SourceType::DayBlock,
        )];

        let reconciler = Reconciler::new(None, false, AliasTable::default());
        let (table, stats) = reconciler.reconcile(month, day, vec![]);
        assert_eq!(table.events.len(), 1);
        assert_eq!(table.events[0].source_type, "month_block");
        assert_eq!(stats.dedup_removed, 1);
    }

    #[test]
    fn test_day_records_fill_uncovered_months() {
        let month = vec![record(
            "2021-05-21",
            "Friday Prayer",
            None,
            None,
            None,
            SourceType::MonthBlock,
        )];
        let day = vec![record(
            "2021-06-04",
            "Friday Prayer",
            None,
            None,
            None,
            SourceType::DayBlock,
        )];

        let (table, _) = Reconciler::default().reconcile(month, day, vec![]);
        assert_eq!(table.events.len(), 2);
    }

    #[test]
    fn test_idless_same_title_different_venues_one_event_two_bookings() {
        let month = vec![
            record("2021-05-21", "Youth Night", None, Some("Gym"), None, SourceType::MonthBlock),
            record("2021-05-21", "Youth Night", None, Some("Hall"), None, SourceType::MonthBlock),
        ];

        let (table, _) = Reconciler::default().reconcile(month, vec![], vec![]);
        assert_eq!(table.events.len(), 1);
        assert_eq!(table.bookings.len(), 2);

        let venues: Vec<&str> = table.bookings.iter().map(|b| b.location_code.as_str()).collect();
        assert_eq!(venues, vec!["Gym", "Hall"]);
        assert!(table
            .bookings
            .iter()
            .all(|b| b.event_key == table.events[0].event_key));
    }

    #[test]
    fn test_booking_pairs_unique() {
        let month = vec![
            record("2021-05-21", "Youth Night", None, Some("Gym"), None, SourceType::MonthBlock),
            record("2021-05-21", "Youth Night!", None, Some("c_Gym"), Some("5"), SourceType::MonthBlock),
        ];

        let (table, _) = Reconciler::default().reconcile(month, vec![], vec![]);
        assert_eq!(table.bookings.len(), 1);
        assert_eq!(table.bookings[0].location_code, "Gym");
    }

    #[test]
    fn test_idless_record_with_distinct_time_survives_id_bearing_twin() {
        // Same date and title, but different time labels: two sessions of
        // one program, not echoes of one event
        let month = vec![
            record("2021-05-21", "Quran Class", Some("1:00 PM"), None, Some("899"), SourceType::MonthBlock),
            record("2021-05-21", "Quran Class", Some("7:00 PM"), None, None, SourceType::MonthBlock),
        ];

        let (table, _) = Reconciler::default().reconcile(month, vec![], vec![]);
        assert_eq!(table.events.len(), 2);

        let mut times: Vec<&str> = table
            .events
            .iter()
            .filter_map(|e| e.time_label.as_deref())
            .collect();
        times.sort();
        assert_eq!(times, vec!["1:00 PM", "7:00 PM"]);
    }

    #[test]
    fn test_event_row_location_is_canonicalized() {
        let month = vec![record(
            "2021-05-21",
            "Friday Prayer",
            Some("1:00 PM"),
            Some("c_Masjid"),
            Some("899"),
            SourceType::MonthBlock,
        )];

        let (table, _) = Reconciler::default().reconcile(month, vec![], vec![]);
        assert_eq!(table.events[0].location_code.as_deref(), Some("Masjid"));
        assert_eq!(table.bookings[0].location_code, "Masjid");
    }

    #[test]
    fn test_dateless_records_dropped() {
        let mut dateless = record("2021-05-21", "Orphan", None, Some("Gym"), None, SourceType::MonthBlock);
        dateless.date = None;

        let (table, stats) = Reconciler::default().reconcile(vec![dateless], vec![], vec![]);
        assert!(table.events.is_empty());
        assert!(table.bookings.is_empty());
        assert_eq!(stats.dropped_dateless, 1);
    }

    #[test]
    fn test_calendar_filter() {
        let mut wrong = record("2021-05-21", "Board Meeting", None, None, None, SourceType::MonthBlock);
        wrong.calendar_name = Some("Board".to_string());
        let mut right = record("2021-05-21", "Friday Prayer", None, None, None, SourceType::MonthBlock);
        right.calendar_name = Some("Events".to_string());
        let unscoped = record("2021-05-21", "Iftar", None, None, None, SourceType::MonthBlock);

        let reconciler = Reconciler::new(Some("Events".to_string()), true, AliasTable::default());
        let (table, stats) = reconciler.reconcile(vec![wrong, right, unscoped], vec![], vec![]);
        assert_eq!(table.events.len(), 2);
        assert_eq!(stats.dropped_calendar, 1);
    }

    #[test]
    fn test_alias_variants_collapse_to_one_event() {
        let month = vec![
            record("2021-09-12", "Arabic Scool at Bilal Host John Doe", None, None, None, SourceType::MonthBlock),
            record("2021-09-12", "Arabic School at Bilal", None, None, Some("77"), SourceType::MonthBlock),
        ];

        let (table, _) = Reconciler::default().reconcile(month, vec![], vec![]);
        assert_eq!(table.events.len(), 1);
        assert_eq!(table.events[0].title_canonical, "arabic school at bilal");
        // The id-bearing record sorts first and defines the event
        assert_eq!(table.events[0].event_id.as_deref(), Some("77"));
    }

    #[test]
    fn test_popup_enrichment_by_id() {
        let month = vec![record(
            "2021-05-21",
            "Friday Prayer",
            Some("1:00 PM"),
            Some("Masjid"),
            Some("899"),
            SourceType::MonthBlock,
        )];
        let popups = vec![PopupDetail {
            event_id: Some("899".to_string()),
            summary: "Led by the visiting imam.".to_string(),
            date_header: Some("Friday, May 21, 2021".to_string()),
        }];

        let (table, _) = Reconciler::default().reconcile(month, vec![], popups);
        assert_eq!(
            table.events[0].popup_summary.as_deref(),
            Some("Led by the visiting imam.")
        );
        assert_eq!(
            table.events[0].event_key,
            "2021-05-21||friday prayer||1:00 pm"
        );
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let records = vec![
            record("2021-05-21", "Friday Prayer", Some("1:00 PM"), Some("Masjid"), Some("899"), SourceType::MonthBlock),
            record("2021-05-21", "Youth Night", None, Some("Gym"), None, SourceType::MonthBlock),
            record("2021-06-04", "Friday Prayer", Some("1:00 PM"), None, None, SourceType::DayBlock),
        ];

        let reconciler = Reconciler::default();
        let (a, _) = reconciler.reconcile(records.clone(), vec![], vec![]);
        let (b, _) = reconciler.reconcile(records, vec![], vec![]);

        let keys_a: Vec<&str> = a.events.iter().map(|e| e.event_key.as_str()).collect();
        let keys_b: Vec<&str> = b.events.iter().map(|e| e.event_key.as_str()).collect();
        assert_eq!(keys_a, keys_b);
        assert_eq!(a.bookings, b.bookings);
    }
}
