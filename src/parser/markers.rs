//! Structural markers for the calendar grid templates
//!
//! The grid templates mark event blocks, popup links, and time labels with a
//! small fixed set of CSS class names; venue codes are the only
//! non-structural class carried by an event block. Everything here is a
//! compiled constant shared by the parsers and the partitioner.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::Selector;

/// Class names that are part of the grid template itself, never venue codes
pub const STRUCTURAL_CLASSES: [&str; 3] = ["CalEvent", "EventLink", "DayWithEvents"];

/// Marker class on each event block element
pub const EVENT_BLOCK_CLASS: &str = "CalEvent";

/// Marker class on the time label span inside an event block
pub const TIME_LABEL_CLASS: &str = "TimeLabel";

// Helper macro to parse selectors safely
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// All divs; event blocks and venue divs are found by class inspection
    /// because class matching must be case-insensitive over archived markup.
    pub static ref DIV: Selector = parse_selector!("div");

    /// Spans, inspected for the time label class
    pub static ref SPAN: Selector = parse_selector!("span");

    /// First anchor in a block carries the display title
    pub static ref ANCHOR: Selector = parse_selector!("a");

    /// No-script fallback container. Its children are raw text, not
    /// elements (the HTML5 tree builder treats noscript like script), so
    /// the fallback link inside is recovered with [`LINK_HREF_RE`] over the
    /// container's text rather than a selector.
    pub static ref NOSCRIPT: Selector = parse_selector!("noscript");

    /// Popup page summary and date header elements
    pub static ref EVENT_SUMMARY: Selector = parse_selector!("#EventSummary");
    pub static ref DATE_HEADER: Selector = parse_selector!("#DateHeader");

    /// Event-block presence test over raw markup, used by the partitioner's
    /// day-page rule without a full parse
    pub static ref EVENT_BLOCK_RE: Regex = Regex::new(r"(?i)\bCalEvent\b").unwrap();

    /// First href attribute inside raw link markup
    pub static ref LINK_HREF_RE: Regex =
        Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).unwrap();

    /// Inline popup-invocation call carrying date and event id positionally:
    /// `PopupWindow(<calendar>, 'YYYY/M/D', 'ID', ...)`
    pub static ref POPUP_CALL_RE: Regex =
        Regex::new(r"PopupWindow\s*\([^,]+,\s*'([^']+)'\s*,\s*'(\d+)'").unwrap();
}

/// Whether a class attribute value is a structural marker rather than a
/// venue code. Case-insensitive, like all class matching over archived
/// markup.
pub fn is_structural_class(class: &str) -> bool {
    STRUCTURAL_CLASSES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(class))
}

/// Whether raw markup contains at least one event-block marker
pub fn has_event_block(html: &str) -> bool {
    EVENT_BLOCK_RE.is_match(html)
}
