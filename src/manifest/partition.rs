//! Manifest partitioning into per-template sub-manifests
//!
//! This is the sole gate controlling what the parsers ever see. Entries land
//! in exactly one of four buckets; anything routed to `other` is never parsed
//! for events. Classification is content-first (the classifier never trusts
//! the URL), with URL operation parameters applied as a secondary filter:
//! grid markup alone is not sufficient because pages with the same visual
//! template can serve different semantic content.

use std::path::Path;

use crate::classify::{classify, PageTemplate};
use crate::manifest::query_params;
use crate::models::{ManifestEntry, PartitionStats};
use crate::parser::markers::has_event_block;

/// Operation parameter values accepted for the month-block bucket
const MONTH_OPS: [&str; 2] = ["ShowIt", "ShowMonth"];

/// Operation parameter value for day pages
const DAY_OP: &str = "ShowDay";

/// The four disjoint sub-manifests produced by one partitioning run
#[derive(Debug, Default)]
pub struct PartitionedManifests {
    pub month_block: Vec<ManifestEntry>,
    pub event_popup: Vec<ManifestEntry>,
    pub day_block: Vec<ManifestEntry>,
    pub other: Vec<ManifestEntry>,
    pub stats: PartitionStats,
}

/// Routes manifest entries into per-template buckets
#[derive(Debug, Clone, Default)]
pub struct Partitioner {
    /// Optional cap on the number of entries examined (sampling runs)
    limit: Option<usize>,
}

impl Partitioner {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit }
    }

    /// Partition the full manifest, reading each entry's snapshot file.
    ///
    /// Entries whose local file is missing or empty are counted and skipped,
    /// not routed. Unreadable-but-present files are treated the same way;
    /// nothing here is fatal.
    pub fn partition(&self, manifest: &[ManifestEntry]) -> PartitionedManifests {
        let mut out = PartitionedManifests::default();

        let take = self.limit.unwrap_or(manifest.len());
        for entry in manifest.iter().take(take) {
            out.stats.total += 1;

            if !entry.has_file() {
                out.stats.skipped_missing += 1;
                continue;
            }

            // has_file() guarantees the path is present
            let path = entry.path.as_deref().unwrap_or_default();
            let html = match read_snapshot(Path::new(path)) {
                Some(html) => html,
                None => {
                    out.stats.skipped_missing += 1;
                    continue;
                }
            };
            if html.trim().is_empty() {
                out.stats.skipped_empty += 1;
                continue;
            }

            self.route(entry, &html, &mut out);
        }

        tracing::info!(
            total = out.stats.total,
            month_block = out.stats.month_block,
            event_popup = out.stats.event_popup,
            day_block = out.stats.day_block,
            other = out.stats.other,
            skipped_missing = out.stats.skipped_missing,
            skipped_empty = out.stats.skipped_empty,
            "Manifest partitioned"
        );

        out
    }

    fn route(&self, entry: &ManifestEntry, html: &str, out: &mut PartitionedManifests) {
        let params = query_params(&entry.original);
        let op = params.get("Op").map(String::as_str).unwrap_or("");

        // XML documents are unclassifiable; the partition stays total over
        // the manifest by routing them to `other`.
        let template = classify(html).unwrap_or(PageTemplate::Other);

        if template == PageTemplate::MonthBlock && MONTH_OPS.contains(&op) {
            out.stats.month_block += 1;
            out.month_block.push(entry.clone());
            return;
        }

        if template == PageTemplate::EventPopup {
            out.stats.event_popup += 1;
            out.event_popup.push(entry.clone());
            return;
        }

        if op == DAY_OP && has_event_block(html) {
            out.stats.day_block += 1;
            out.day_block.push(entry.clone());
            return;
        }

        out.stats.other += 1;
        out.other.push(entry.clone());
    }
}

fn read_snapshot(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        // Archived files occasionally carry broken encodings; lossy decoding
        // matches the permissive substring classification downstream.
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_snapshot(dir: &TempDir, name: &str, html: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, html).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn entry(original: &str, path: Option<String>) -> ManifestEntry {
        ManifestEntry {
            timestamp: "20210521120000".to_string(),
            original: original.to_string(),
            path,
            ..Default::default()
        }
    }

    const MONTH_HTML: &str = r#"<html><div class="BlockView"><table class="CalBlock"><div class="CalEvent">x</div></table></div></html>"#;
    const POPUP_HTML: &str = r#"<html><body class="EventPopup"><div id="EventSummary">x</div></body></html>"#;
    const DAY_HTML: &str = r#"<html><body><div class="CalEvent">x</div></body></html>"#;

    #[test]
    fn test_month_block_requires_show_op() {
        let dir = TempDir::new().unwrap();
        let p = write_snapshot(&dir, "m.html", MONTH_HTML);

        let manifest = vec![
            entry("https://x.org/cal.php?Op=ShowMonth", Some(p.clone())),
            entry("https://x.org/cal.php?Op=ShowIt", Some(p.clone())),
            // Grid markup but an unrelated operation: dropped to other
            entry("https://x.org/cal.php?Op=EditEvent", Some(p)),
        ];

        let out = Partitioner::default().partition(&manifest);
        assert_eq!(out.month_block.len(), 2);
        assert_eq!(out.other.len(), 1);
    }

    #[test]
    fn test_popup_routed_unconditionally() {
        let dir = TempDir::new().unwrap();
        let p = write_snapshot(&dir, "p.html", POPUP_HTML);

        let manifest = vec![entry("https://x.org/cal.php?Op=EditEvent&ID=9", Some(p))];
        let out = Partitioner::default().partition(&manifest);
        assert_eq!(out.event_popup.len(), 1);
    }

    #[test]
    fn test_day_block_needs_op_and_event_marker() {
        let dir = TempDir::new().unwrap();
        let with_events = write_snapshot(&dir, "d1.html", DAY_HTML);
        let without_events = write_snapshot(&dir, "d2.html", "<html><body>empty day</body></html>");

        let manifest = vec![
            entry("https://x.org/cal.php?Op=ShowDay", Some(with_events.clone())),
            entry("https://x.org/cal.php?Op=ShowDay", Some(without_events)),
            entry("https://x.org/cal.php?Op=ShowWeek", Some(with_events)),
        ];

        let out = Partitioner::default().partition(&manifest);
        assert_eq!(out.day_block.len(), 1);
        assert_eq!(out.other.len(), 2);
    }

    #[test]
    fn test_missing_and_empty_files_are_counted_not_routed() {
        let dir = TempDir::new().unwrap();
        let empty = write_snapshot(&dir, "empty.html", "   \n");

        let manifest = vec![
            entry("https://x.org/cal.php?Op=ShowMonth", None),
            entry("https://x.org/cal.php?Op=ShowMonth", Some("no/such/file.html".to_string())),
            entry("https://x.org/cal.php?Op=ShowMonth", Some(empty)),
        ];

        let out = Partitioner::default().partition(&manifest);
        assert_eq!(out.stats.routed(), 0);
        // Zero-length and whitespace-only files both count as skips; the
        // zero-byte case never reaches the read.
        assert_eq!(out.stats.skipped_missing + out.stats.skipped_empty, 3);
    }

    #[test]
    fn test_xml_feed_routes_to_other() {
        let dir = TempDir::new().unwrap();
        let p = write_snapshot(&dir, "feed.xml", "<?xml version=\"1.0\"?><rss><channel/></rss>");

        let manifest = vec![entry("https://x.org/cal.php?Op=RSS", Some(p))];
        let out = Partitioner::default().partition(&manifest);
        assert_eq!(out.other.len(), 1);
    }

    #[test]
    fn test_limit_caps_processing() {
        let dir = TempDir::new().unwrap();
        let p = write_snapshot(&dir, "m.html", MONTH_HTML);

        let manifest: Vec<_> = (0..5)
            .map(|_| entry("https://x.org/cal.php?Op=ShowMonth", Some(p.clone())))
            .collect();

        let out = Partitioner::new(Some(2)).partition(&manifest);
        assert_eq!(out.stats.total, 2);
        assert_eq!(out.month_block.len(), 2);
    }
}
