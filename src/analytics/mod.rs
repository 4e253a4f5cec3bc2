//! Yearly activity analytics over the canonical event table
//!
//! Everything here is a pure aggregation of the persisted table; no file or
//! snapshot is consulted. Events and bookings are counted separately on
//! purpose: an event using three venues is one event with three bookings.
//!
//! Archive coverage is uneven across years, so each yearly summary carries
//! caveat notes instead of silently reporting a thin year as a real decline.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::models::CanonicalTable;

/// Months of coverage below which a year is flagged as partial
const PARTIAL_YEAR_MONTHS: usize = 10;

/// Events-per-month floor below which a year is flagged as low-activity
const LOW_ACTIVITY_EVENTS_PER_MONTH: f64 = 5.0;

/// Per-year cap on reported busiest days
const TOP_DAYS_PER_YEAR: usize = 10;

/// Per-year cap on reported top programs
const TOP_PROGRAMS_PER_YEAR: usize = 20;

/// One year of activity, with coverage caveats
#[derive(Debug, Clone, Serialize)]
pub struct YearlySummary {
    pub year: i32,
    /// Distinct canonical events dated in this year
    pub events: usize,
    /// Distinct months of the year with at least one event
    pub months: usize,
    /// Distinct canonical program names
    pub unique_programs: usize,
    /// Distinct dates with at least one event
    pub unique_days: usize,
    pub events_per_month: f64,
    pub events_per_week_est: f64,
    pub venue_bookings: usize,
    pub avg_venues_per_event: f64,
    /// Change in event count against the previous summarized year; absent
    /// for the first year and whenever the previous year had zero events
    pub growth_pct: Option<f64>,
    /// Semicolon-joined coverage caveats, empty when none apply
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramCount {
    pub title_canonical: String,
    pub events: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearProgramCount {
    pub year: i32,
    pub title_canonical: String,
    pub events: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueYearCount {
    pub year: i32,
    pub location_code: String,
    pub bookings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueFirstSeen {
    pub location_code: String,
    pub first_year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayCount {
    pub year: i32,
    pub date: String,
    pub events: usize,
}

/// Event count for one observed month, with change against the previous
/// observed month
#[derive(Debug, Clone, Serialize)]
pub struct MonthCount {
    pub year_month: String,
    pub events: usize,
    /// Absent for the first observed month or a zero-event predecessor
    pub change_pct: Option<f64>,
}

/// Full analytics output for one canonical table
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsReport {
    pub yearly: Vec<YearlySummary>,
    pub monthly: Vec<MonthCount>,
    pub programs_overall: Vec<ProgramCount>,
    pub programs_by_year: Vec<YearProgramCount>,
    pub top_programs_by_year: Vec<YearProgramCount>,
    pub venues_by_year: Vec<VenueYearCount>,
    pub venue_first_seen: Vec<VenueFirstSeen>,
    pub top_days_by_year: Vec<DayCount>,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn parse_year(s: &str) -> Option<i32> {
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

/// Aggregate a canonical table into the full analytics report.
///
/// Rows without a well-formed four-digit year are skipped; bookings are
/// attributed to the year prefix of their event key.
pub fn aggregate(table: &CanonicalTable) -> AnalyticsReport {
    let mut events_by_year: BTreeMap<i32, usize> = BTreeMap::new();
    let mut months_by_year: BTreeMap<i32, BTreeSet<String>> = BTreeMap::new();
    let mut days_by_year: BTreeMap<i32, BTreeSet<String>> = BTreeMap::new();
    let mut programs_by_year: BTreeMap<i32, BTreeSet<String>> = BTreeMap::new();
    let mut program_counts: HashMap<String, usize> = HashMap::new();
    let mut year_program_counts: HashMap<(i32, String), usize> = HashMap::new();
    let mut day_counts: HashMap<(i32, String), usize> = HashMap::new();
    let mut month_counts: BTreeMap<String, usize> = BTreeMap::new();

    let mut skipped = 0usize;
    for event in &table.events {
        let Some(year) = parse_year(&event.year) else {
            skipped += 1;
            continue;
        };

        *events_by_year.entry(year).or_default() += 1;
        months_by_year
            .entry(year)
            .or_default()
            .insert(event.year_month.clone());
        days_by_year.entry(year).or_default().insert(event.date.clone());
        programs_by_year
            .entry(year)
            .or_default()
            .insert(event.title_canonical.clone());
        *program_counts.entry(event.title_canonical.clone()).or_default() += 1;
        *year_program_counts
            .entry((year, event.title_canonical.clone()))
            .or_default() += 1;
        *day_counts.entry((year, event.date.clone())).or_default() += 1;
        *month_counts.entry(event.year_month.clone()).or_default() += 1;
    }
    if skipped > 0 {
        tracing::warn!(skipped, "Skipped events without a well-formed year");
    }

    let mut bookings_by_year: BTreeMap<i32, usize> = BTreeMap::new();
    let mut venue_year_counts: HashMap<(i32, String), usize> = HashMap::new();
    let mut first_seen: HashMap<String, i32> = HashMap::new();

    for booking in &table.bookings {
        let Some(year) = booking.event_key.get(..4).and_then(parse_year) else {
            continue;
        };
        *bookings_by_year.entry(year).or_default() += 1;
        *venue_year_counts
            .entry((year, booking.location_code.clone()))
            .or_default() += 1;
        first_seen
            .entry(booking.location_code.clone())
            .and_modify(|y| *y = (*y).min(year))
            .or_insert(year);
    }

    AnalyticsReport {
        yearly: yearly_summaries(&events_by_year, &months_by_year, &days_by_year, &programs_by_year, &bookings_by_year),
        monthly: monthly_counts(&month_counts),
        programs_overall: overall_programs(program_counts),
        programs_by_year: per_year_programs(&year_program_counts, usize::MAX),
        top_programs_by_year: per_year_programs(&year_program_counts, TOP_PROGRAMS_PER_YEAR),
        venues_by_year: venue_years(venue_year_counts),
        venue_first_seen: first_seen_rows(first_seen),
        top_days_by_year: top_days(day_counts),
    }
}

fn yearly_summaries(
    events_by_year: &BTreeMap<i32, usize>,
    months_by_year: &BTreeMap<i32, BTreeSet<String>>,
    days_by_year: &BTreeMap<i32, BTreeSet<String>>,
    programs_by_year: &BTreeMap<i32, BTreeSet<String>>,
    bookings_by_year: &BTreeMap<i32, usize>,
) -> Vec<YearlySummary> {
    let mut rows = Vec::new();
    let mut prev_events: Option<usize> = None;

    for (&year, &events) in events_by_year {
        let months = months_by_year.get(&year).map(BTreeSet::len).unwrap_or(0);
        let unique_days = days_by_year.get(&year).map(BTreeSet::len).unwrap_or(0);
        let unique_programs = programs_by_year.get(&year).map(BTreeSet::len).unwrap_or(0);
        let venue_bookings = bookings_by_year.get(&year).copied().unwrap_or(0);

        let events_per_month = if months > 0 {
            round1(events as f64 / months as f64)
        } else {
            0.0
        };
        let events_per_week_est = round1(events as f64 / 52.0);
        let avg_venues_per_event = if events > 0 {
            round2(venue_bookings as f64 / events as f64)
        } else {
            0.0
        };

        let growth_pct = match prev_events {
            Some(prev) if prev > 0 => {
                Some(round1((events as f64 - prev as f64) / prev as f64 * 100.0))
            }
            _ => None,
        };

        let mut notes = Vec::new();
        if months < PARTIAL_YEAR_MONTHS {
            notes.push("Partial year coverage in archive");
        }
        if events_per_month < LOW_ACTIVITY_EVENTS_PER_MONTH {
            notes.push("Low activity year or events moved off calendar");
        }

        rows.push(YearlySummary {
            year,
            events,
            months,
            unique_programs,
            unique_days,
            events_per_month,
            events_per_week_est,
            venue_bookings,
            avg_venues_per_event,
            growth_pct,
            notes: notes.join("; "),
        });
        prev_events = Some(events);
    }
    rows
}

/// Changes compare consecutive observed months, not calendar-adjacent ones;
/// archive gaps mean the previous observed month may be years earlier.
fn monthly_counts(counts: &BTreeMap<String, usize>) -> Vec<MonthCount> {
    let mut rows = Vec::with_capacity(counts.len());
    let mut prev: Option<usize> = None;

    for (year_month, &events) in counts {
        let change_pct = match prev {
            Some(p) if p > 0 => Some(round1((events as f64 - p as f64) / p as f64 * 100.0)),
            _ => None,
        };
        rows.push(MonthCount {
            year_month: year_month.clone(),
            events,
            change_pct,
        });
        prev = Some(events);
    }
    rows
}

fn overall_programs(counts: HashMap<String, usize>) -> Vec<ProgramCount> {
    let mut rows: Vec<ProgramCount> = counts
        .into_iter()
        .map(|(title_canonical, events)| ProgramCount {
            title_canonical,
            events,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.events
            .cmp(&a.events)
            .then_with(|| a.title_canonical.cmp(&b.title_canonical))
    });
    rows
}

fn per_year_programs(
    counts: &HashMap<(i32, String), usize>,
    per_year_cap: usize,
) -> Vec<YearProgramCount> {
    let mut by_year: BTreeMap<i32, Vec<YearProgramCount>> = BTreeMap::new();
    for ((year, title_canonical), &events) in counts {
        by_year.entry(*year).or_default().push(YearProgramCount {
            year: *year,
            title_canonical: title_canonical.clone(),
            events,
        });
    }

    let mut rows = Vec::new();
    for (_, mut year_rows) in by_year {
        year_rows.sort_by(|a, b| {
            b.events
                .cmp(&a.events)
                .then_with(|| a.title_canonical.cmp(&b.title_canonical))
        });
        year_rows.truncate(per_year_cap);
        rows.extend(year_rows);
    }
    rows
}

fn venue_years(counts: HashMap<(i32, String), usize>) -> Vec<VenueYearCount> {
    let mut rows: Vec<VenueYearCount> = counts
        .into_iter()
        .map(|((year, location_code), bookings)| VenueYearCount {
            year,
            location_code,
            bookings,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then_with(|| b.bookings.cmp(&a.bookings))
            .then_with(|| a.location_code.cmp(&b.location_code))
    });
    rows
}

fn first_seen_rows(first_seen: HashMap<String, i32>) -> Vec<VenueFirstSeen> {
    let mut rows: Vec<VenueFirstSeen> = first_seen
        .into_iter()
        .map(|(location_code, first_year)| VenueFirstSeen {
            location_code,
            first_year,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.first_year
            .cmp(&b.first_year)
            .then_with(|| a.location_code.cmp(&b.location_code))
    });
    rows
}

fn top_days(counts: HashMap<(i32, String), usize>) -> Vec<DayCount> {
    let mut by_year: BTreeMap<i32, Vec<DayCount>> = BTreeMap::new();
    for ((year, date), &events) in &counts {
        by_year.entry(*year).or_default().push(DayCount {
            year: *year,
            date: date.clone(),
            events,
        });
    }

    let mut rows = Vec::new();
    for (_, mut year_rows) in by_year {
        year_rows.sort_by(|a, b| b.events.cmp(&a.events).then_with(|| a.date.cmp(&b.date)));
        year_rows.truncate(TOP_DAYS_PER_YEAR);
        rows.extend(year_rows);
    }
    rows
}
