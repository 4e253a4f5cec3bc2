//! Snapshot classification by content signature
//!
//! Assigns one of a fixed set of page-template labels to raw archived HTML.
//! Matching is case-insensitive substring checking against the raw markup,
//! deliberately permissive because archived markup is inconsistently
//! well-formed. Query parameters are never consulted here; pages with
//! misleading URLs are common in the archive and only content is trusted.

use serde::{Deserialize, Serialize};

use crate::utils::error::ClassifyError;

/// Page-template label for one archived snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageTemplate {
    /// Month calendar grid in block view
    MonthBlock,
    /// Calendar grid markup without the block-view marker
    CalendarGridOther,
    /// Single-event popup page
    EventPopup,
    /// RSS/Atom feed output
    Feed,
    /// Hosting platform page that is none of the above
    CalciumOther,
    /// Anything else
    Other,
}

impl PageTemplate {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonthBlock => "month_block",
            Self::CalendarGridOther => "calendar_grid_other",
            Self::EventPopup => "event_popup",
            Self::Feed => "feed",
            Self::CalciumOther => "calcium_other",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for PageTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check whether the document is a non-HTML XML document.
///
/// Looks for a leading `<?xml` declaration without an `<html` tag in the
/// first 200 characters. Such documents (raw feed output, mostly) are not
/// classified at all.
pub fn is_xml_document(html: &str) -> bool {
    let head: String = html.trim_start().chars().take(200).collect::<String>().to_lowercase();
    head.starts_with("<?xml") && !head.contains("<html")
}

/// Classify raw snapshot markup into a [`PageTemplate`].
///
/// Deterministic and content-only; performs no I/O. Signature checks run in
/// priority order, so a popup page that also contains grid markup is still a
/// popup.
///
/// # Errors
///
/// Returns [`ClassifyError::UnsupportedDocument`] for non-HTML XML documents.
pub fn classify(html: &str) -> Result<PageTemplate, ClassifyError> {
    if is_xml_document(html) {
        return Err(ClassifyError::UnsupportedDocument);
    }

    let low = html.to_lowercase();

    if low.contains(r#"class="eventpopup""#) || low.contains(r#"id="eventsummary""#) {
        return Ok(PageTemplate::EventPopup);
    }

    if low.contains(r#"class="calblock""#) || low.contains("class='calblock'") {
        if low.contains(r#"class="blockview""#) || low.contains("class='blockview'") {
            return Ok(PageTemplate::MonthBlock);
        }
        return Ok(PageTemplate::CalendarGridOther);
    }

    if low.contains("<rss") || low.contains("<feed") || low.contains("op=rss") {
        return Ok(PageTemplate::Feed);
    }

    if low.contains("calcium web calendar") || low.contains("brownbearsw.com") {
        return Ok(PageTemplate::CalciumOther);
    }

    Ok(PageTemplate::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_event_popup() {
        let html = r#"<html><body class="EventPopup"><div id="EventSummary">Eid</div></body></html>"#;
        assert_eq!(classify(html).unwrap(), PageTemplate::EventPopup);
    }

    #[test]
    fn test_classify_popup_by_summary_id_alone() {
        let html = r#"<html><body><div id="EventSummary">Eid</div></body></html>"#;
        assert_eq!(classify(html).unwrap(), PageTemplate::EventPopup);
    }

    #[test]
    fn test_classify_month_block_needs_both_markers() {
        let html = r#"<html><div class="BlockView"><table class="CalBlock"></table></div></html>"#;
        assert_eq!(classify(html).unwrap(), PageTemplate::MonthBlock);

        let grid_only = r#"<html><table class="CalBlock"></table></html>"#;
        assert_eq!(classify(grid_only).unwrap(), PageTemplate::CalendarGridOther);
    }

    #[test]
    fn test_classify_single_quoted_markers() {
        let html = "<html><div class='BlockView'><table class='CalBlock'></table></div></html>";
        assert_eq!(classify(html).unwrap(), PageTemplate::MonthBlock);
    }

    #[test]
    fn test_classify_feed() {
        let html = "<html><body><a href=\"cal.php?Op=RSS\">feed</a></body></html>";
        assert_eq!(classify(html).unwrap(), PageTemplate::Feed);
    }

    #[test]
    fn test_classify_platform_page() {
        let html = "<html><body>Powered by Calcium Web Calendar</body></html>";
        assert_eq!(classify(html).unwrap(), PageTemplate::CalciumOther);
    }

    #[test]
    fn test_classify_other() {
        let html = "<html><body><p>Nothing recognizable</p></body></html>";
        assert_eq!(classify(html).unwrap(), PageTemplate::Other);
    }

    #[test]
    fn test_popup_outranks_grid_markers() {
        let html = r#"<html><div id="EventSummary"></div><div class="BlockView"><table class="CalBlock"></table></div></html>"#;
        assert_eq!(classify(html).unwrap(), PageTemplate::EventPopup);
    }

    #[test]
    fn test_xml_document_refused() {
        let xml = "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel/></rss>";
        assert!(is_xml_document(xml));
        assert!(matches!(classify(xml), Err(ClassifyError::UnsupportedDocument)));
    }

    #[test]
    fn test_xhtml_is_not_refused() {
        let xhtml = "<?xml version=\"1.0\"?>\n<html xmlns=\"http://www.w3.org/1999/xhtml\"><body/></html>";
        assert!(!is_xml_document(xhtml));
        assert!(classify(xhtml).is_ok());
    }

    #[test]
    fn test_case_insensitive_matching() {
        let html = r#"<HTML><BODY CLASS="EVENTPOPUP"></BODY></HTML>"#;
        assert_eq!(classify(html).unwrap(), PageTemplate::EventPopup);
    }

    #[test]
    fn test_template_display() {
        assert_eq!(PageTemplate::MonthBlock.to_string(), "month_block");
        assert_eq!(PageTemplate::CalciumOther.to_string(), "calcium_other");
    }
}
