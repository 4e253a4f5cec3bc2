//! Detail extraction from single-event popup snapshots
//!
//! Popup pages carry a free-text summary element and sometimes a date
//! header. They never mint event identity on their own; the reconciler only
//! uses popup details to enrich events already established from the grids,
//! joined by the event id taken from the snapshot URL.

use scraper::Html;

use crate::manifest::query_params;
use crate::models::PopupDetail;
use crate::parser::markers;
use crate::parser::text::clean;

/// Parses single-event popup snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct PopupParser;

impl PopupParser {
    /// Extract the popup detail from one snapshot.
    ///
    /// `original_url` is the snapshot's archived URL; its `ID` parameter is
    /// the join key. Pages without a summary element yield `None`.
    pub fn parse(html: &str, original_url: &str) -> Option<PopupDetail> {
        let document = Html::parse_document(html);

        let summary = document
            .select(&markers::EVENT_SUMMARY)
            .next()
            .map(|e| clean(&e.text().collect::<Vec<_>>().join(" ")))
            .filter(|s| !s.is_empty())?;

        let date_header = document
            .select(&markers::DATE_HEADER)
            .next()
            .map(|e| clean(&e.text().collect::<Vec<_>>().join(" ")))
            .filter(|s| !s.is_empty());

        let event_id = query_params(original_url).get("ID").cloned();

        Some(PopupDetail {
            event_id,
            summary,
            date_header,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POPUP: &str = r#"<html><body class="EventPopup">
        <div id="DateHeader">Friday, May 21, 2021</div>
        <div id="EventSummary">Friday Prayer led by the visiting imam.</div>
    </body></html>"#;

    #[test]
    fn test_popup_detail() {
        let detail = PopupParser::parse(
            POPUP,
            "https://example.org/Calcium40.php?Op=ShowIt&ID=899&Date=2021/5/21",
        )
        .unwrap();

        assert_eq!(detail.event_id.as_deref(), Some("899"));
        assert_eq!(detail.summary, "Friday Prayer led by the visiting imam.");
        assert_eq!(detail.date_header.as_deref(), Some("Friday, May 21, 2021"));
    }

    #[test]
    fn test_popup_without_date_header() {
        let html = r#"<html><div id="EventSummary">Community Iftar</div></html>"#;
        let detail = PopupParser::parse(html, "cal.php?Op=ShowIt&ID=42").unwrap();
        assert_eq!(detail.event_id.as_deref(), Some("42"));
        assert!(detail.date_header.is_none());
    }

    #[test]
    fn test_popup_without_id_param() {
        let html = r#"<html><div id="EventSummary">Community Iftar</div></html>"#;
        let detail = PopupParser::parse(html, "https://example.org/cal.php?Op=ShowIt").unwrap();
        assert!(detail.event_id.is_none());
    }

    #[test]
    fn test_page_without_summary_yields_nothing() {
        let html = r#"<html><div id="DateHeader">May 21</div></html>"#;
        assert!(PopupParser::parse(html, "cal.php?ID=1").is_none());
    }

    #[test]
    fn test_empty_summary_yields_nothing() {
        let html = r#"<html><div id="EventSummary">   </div></html>"#;
        assert!(PopupParser::parse(html, "cal.php?ID=1").is_none());
    }
}
