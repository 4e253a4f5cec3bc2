//! Report artifacts derived from the analytics aggregation
//!
//! One CSV per aggregation, plus a plain-text brief. These are inputs for a
//! separate report renderer; wording in the brief stays neutral and names
//! no organization.

use std::path::{Path, PathBuf};

use crate::analytics::AnalyticsReport;
use crate::error::Result;

/// Cap on rows in the overall top-programs artifact
const TOP_PROGRAMS_OVERALL_CAP: usize = 200;

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_default()
}

fn write_csv(path: &Path, header: &str, rows: Vec<String>) -> Result<()> {
    let mut out = String::with_capacity(rows.len() * 32 + header.len() + 1);
    out.push_str(header);
    out.push('\n');
    for row in rows {
        out.push_str(&row);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write every report artifact into `out_dir`, creating it as needed.
/// Returns the paths written.
pub fn write_report(out_dir: &Path, report: &AnalyticsReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    let path = out_dir.join("yearly_summary.csv");
    write_csv(
        &path,
        "year,events,months,unique_programs,unique_days,events_per_month,events_per_week_est,venue_bookings,avg_venues_per_event,growth_pct,notes",
        report
            .yearly
            .iter()
            .map(|y| {
                format!(
                    "{},{},{},{},{},{:.1},{:.1},{},{:.2},{},{}",
                    y.year,
                    y.events,
                    y.months,
                    y.unique_programs,
                    y.unique_days,
                    y.events_per_month,
                    y.events_per_week_est,
                    y.venue_bookings,
                    y.avg_venues_per_event,
                    fmt_opt(y.growth_pct),
                    quote(&y.notes),
                )
            })
            .collect(),
    )?;
    written.push(path);

    let path = out_dir.join("monthly_events.csv");
    write_csv(
        &path,
        "year_month,events,change_pct",
        report
            .monthly
            .iter()
            .map(|m| format!("{},{},{}", m.year_month, m.events, fmt_opt(m.change_pct)))
            .collect(),
    )?;
    written.push(path);

    let path = out_dir.join("top_programs_overall.csv");
    write_csv(
        &path,
        "title_canonical,events",
        report
            .programs_overall
            .iter()
            .take(TOP_PROGRAMS_OVERALL_CAP)
            .map(|p| format!("{},{}", quote(&p.title_canonical), p.events))
            .collect(),
    )?;
    written.push(path);

    let path = out_dir.join("programs_by_year_all.csv");
    write_csv(
        &path,
        "year,title_canonical,events",
        report
            .programs_by_year
            .iter()
            .map(|p| format!("{},{},{}", p.year, quote(&p.title_canonical), p.events))
            .collect(),
    )?;
    written.push(path);

    let path = out_dir.join("top20_programs_by_year.csv");
    write_csv(
        &path,
        "year,title_canonical,events",
        report
            .top_programs_by_year
            .iter()
            .map(|p| format!("{},{},{}", p.year, quote(&p.title_canonical), p.events))
            .collect(),
    )?;
    written.push(path);

    let path = out_dir.join("venue_events_by_year.csv");
    write_csv(
        &path,
        "year,location_code,bookings",
        report
            .venues_by_year
            .iter()
            .map(|v| format!("{},{},{}", v.year, quote(&v.location_code), v.bookings))
            .collect(),
    )?;
    written.push(path);

    let path = out_dir.join("venue_first_seen_year.csv");
    write_csv(
        &path,
        "location_code,first_year",
        report
            .venue_first_seen
            .iter()
            .map(|v| format!("{},{}", quote(&v.location_code), v.first_year))
            .collect(),
    )?;
    written.push(path);

    let path = out_dir.join("top_days_by_year.csv");
    write_csv(
        &path,
        "year,date,events",
        report
            .top_days_by_year
            .iter()
            .map(|d| format!("{},{},{}", d.year, d.date, d.events))
            .collect(),
    )?;
    written.push(path);

    let path = out_dir.join("yearly_brief.txt");
    std::fs::write(&path, render_brief(report))?;
    written.push(path);

    tracing::info!(dir = %out_dir.display(), artifacts = written.len(), "Report written");
    Ok(written)
}

fn render_brief(report: &AnalyticsReport) -> String {
    let mut out = String::from("Calendar activity by year\n=========================\n\n");
    for y in &report.yearly {
        let growth = match y.growth_pct {
            Some(pct) => format!("{pct:+.1}% vs prior year"),
            None => "no prior-year baseline".to_string(),
        };
        out.push_str(&format!(
            "{}: {} events across {} months ({:.1}/month), {} distinct programs, {} venue bookings; {}.\n",
            y.year, y.events, y.months, y.events_per_month, y.unique_programs, y.venue_bookings, growth,
        ));
        if !y.notes.is_empty() {
            out.push_str(&format!("      Note: {}\n", y.notes));
        }
    }
    out
}
