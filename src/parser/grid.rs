//! Event extraction from calendar grid snapshots
//!
//! Month and day grids share one block template: each event is a `div`
//! carrying the event-block marker class, holding a nested venue div, a
//! time-label span, a display-title anchor, and a no-script fallback link
//! whose query string carries the canonical event id and date. The fallback
//! link is the preferred identity source; the inline popup-invocation call
//! fills in whatever the link could not resolve.
//!
//! Records missing a date are still returned here. Dropping them is an
//! identity decision that belongs to the reconciler, which also logs how
//! many were dropped.

use scraper::{ElementRef, Html};

use crate::manifest::query_params;
use crate::models::{RawEventRecord, SourceType};
use crate::parser::markers::{
    self, is_structural_class, EVENT_BLOCK_CLASS, LINK_HREF_RE, POPUP_CALL_RE, TIME_LABEL_CLASS,
};
use crate::parser::text::{clean, normalize_location, normalize_title, parse_compact_date};

/// Parses event records out of grid-template snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct GridParser;

impl GridParser {
    /// Extract every event block from one snapshot.
    ///
    /// `calendar_name` is the calendar the snapshot URL was scoped to; it is
    /// carried onto each record for downstream filtering, never used here.
    pub fn parse(
        html: &str,
        calendar_name: Option<&str>,
        source: SourceType,
    ) -> Vec<RawEventRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for block in document.select(&markers::DIV) {
            let is_event_block = block
                .value()
                .classes()
                .any(|c| c.eq_ignore_ascii_case(EVENT_BLOCK_CLASS));
            if !is_event_block {
                continue;
            }
            if let Some(record) = Self::parse_block(block, calendar_name, source) {
                records.push(record);
            }
        }

        tracing::debug!(count = records.len(), source = %source, "Extracted grid records");
        records
    }

    fn parse_block(
        block: ElementRef<'_>,
        calendar_name: Option<&str>,
        source: SourceType,
    ) -> Option<RawEventRecord> {
        let title_raw = block
            .select(&markers::ANCHOR)
            .next()
            .map(|a| a.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_else(|| block.text().collect::<Vec<_>>().join(" "));
        let title = clean(&title_raw);
        if title.is_empty() {
            return None;
        }

        let time_label = block
            .select(&markers::SPAN)
            .find(|s| {
                s.value()
                    .classes()
                    .any(|c| c.eq_ignore_ascii_case(TIME_LABEL_CLASS))
            })
            .map(|s| clean(&s.text().collect::<Vec<_>>().join(" ")))
            .filter(|t| !t.is_empty());

        let location_code = Self::location_of(block);
        let (date, event_id) = Self::identity_of(block);

        Some(RawEventRecord {
            date,
            title_norm: normalize_title(&title),
            title,
            time_label,
            location_code,
            calendar_name: calendar_name.map(str::to_string),
            event_id,
            source,
        })
    }

    /// The venue code is the first non-structural class carried by a div
    /// nested inside the block. The block's own classes are never venue
    /// codes; stray presentation classes there must not shadow the real
    /// venue div.
    fn location_of(block: ElementRef<'_>) -> Option<String> {
        block
            .select(&markers::DIV)
            .flat_map(|d| d.value().classes().map(str::to_string).collect::<Vec<_>>())
            .find(|c| !is_structural_class(c))
            .and_then(|c| normalize_location(&c))
    }

    /// Canonical id and date. The no-script link's `ID` and `Date`
    /// parameters come first; whenever the date stays unresolved, the inline
    /// popup-invocation call supplies it (and the id too, if still absent).
    fn identity_of(block: ElementRef<'_>) -> (Option<String>, Option<String>) {
        let mut event_id = None;
        let mut date = None;

        if let Some(noscript) = block.select(&markers::NOSCRIPT).next() {
            // Raw text content; entity references inside are undecoded
            let raw: String = noscript.text().collect();
            if let Some(caps) = LINK_HREF_RE.captures(&raw) {
                let href = caps[1].replace("&amp;", "&");
                let params = query_params(&href);
                event_id = params.get("ID").cloned();
                date = params.get("Date").and_then(|d| parse_compact_date(d));
            }
        }

        if date.is_none() {
            if let Some(caps) = POPUP_CALL_RE.captures(&block.html()) {
                date = parse_compact_date(&caps[1]);
                if event_id.is_none() {
                    event_id = Some(caps[2].to_string());
                }
            }
        }

        (date, event_id)
    }
}
