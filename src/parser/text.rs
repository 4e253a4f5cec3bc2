//! Text normalization helpers for extracted event fields
//!
//! Archived markup mixes entity-encoded non-breaking spaces, stray
//! whitespace, and inconsistent casing; every extracted field goes through
//! [`clean`] before use. [`normalize_title`] is the identity form used for
//! dedup comparisons (distinct from the lossier canonical form applied in
//! the reconciler).

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_WORD_RE: Regex = Regex::new(r"[^\w\s]").unwrap();
}

/// Collapse whitespace runs to single spaces and trim.
///
/// Non-breaking spaces are folded into ordinary spaces first.
///
/// # Examples
///
/// ```
/// use almanac::parser::text::clean;
///
/// assert_eq!(clean("  Friday\u{a0}\u{a0} Prayer \n"), "Friday Prayer");
/// ```
pub fn clean(text: &str) -> String {
    let replaced = text.replace('\u{a0}', " ");
    WHITESPACE_RE.replace_all(&replaced, " ").trim().to_string()
}

/// Normalized title form used for identity comparisons: lowercased,
/// punctuation stripped, whitespace collapsed.
///
/// # Examples
///
/// ```
/// use almanac::parser::text::normalize_title;
///
/// assert_eq!(normalize_title("Friday  Prayer!"), "friday prayer");
/// ```
pub fn normalize_title(title: &str) -> String {
    let lowered = clean(title).to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lowered, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Normalize a venue code: clean, strip a literal `c_` prefix, and drop
/// empty results.
///
/// # Examples
///
/// ```
/// use almanac::parser::text::normalize_location;
///
/// assert_eq!(normalize_location("c_Masjid"), Some("Masjid".to_string()));
/// assert_eq!(normalize_location("Gym"), Some("Gym".to_string()));
/// assert_eq!(normalize_location("  "), None);
/// ```
pub fn normalize_location(location: &str) -> Option<String> {
    let cleaned = clean(location);
    if cleaned.is_empty() {
        return None;
    }
    let stripped = if cleaned.to_lowercase().starts_with("c_") {
        cleaned[2..].to_string()
    } else {
        cleaned
    };
    if stripped.is_empty() {
        None
    } else {
        Some(stripped)
    }
}

/// Parse the compact `YYYY/M/D` date form used in popup links into
/// `YYYY-MM-DD`. Returns `None` for anything that is not a real date.
///
/// # Examples
///
/// ```
/// use almanac::parser::text::parse_compact_date;
///
/// assert_eq!(parse_compact_date("2021/5/21"), Some("2021-05-21".to_string()));
/// assert_eq!(parse_compact_date("2021/5"), None);
/// ```
pub fn parse_compact_date(raw: &str) -> Option<String> {
    let mut parts = raw.splitn(3, '/');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_nbsp_and_runs() {
        assert_eq!(clean("a\u{a0}b   c\t\nd"), "a b c d");
        assert_eq!(clean(""), "");
        assert_eq!(clean("   "), "");
    }

    #[test]
    fn test_normalize_title_strips_punctuation() {
        assert_eq!(normalize_title("Qur'an Study (weekly)"), "quran study weekly");
        assert_eq!(normalize_title("Friday Prayer"), "friday prayer");
    }

    #[test]
    fn test_normalize_title_unicode_word_chars_survive() {
        assert_eq!(normalize_title("Ramadān Iftar"), "ramadān iftar");
    }

    #[test]
    fn test_normalize_location_prefix() {
        assert_eq!(normalize_location("c_Masjid"), Some("Masjid".to_string()));
        assert_eq!(normalize_location("C_Gym"), Some("Gym".to_string()));
        assert_eq!(normalize_location("Masjid"), Some("Masjid".to_string()));
        assert_eq!(normalize_location("c_"), None);
        assert_eq!(normalize_location(""), None);
    }

    #[test]
    fn test_parse_compact_date() {
        assert_eq!(parse_compact_date("2021/5/21"), Some("2021-05-21".to_string()));
        assert_eq!(parse_compact_date("2021/12/1"), Some("2021-12-01".to_string()));
        assert_eq!(parse_compact_date("2021/13/1"), None);
        assert_eq!(parse_compact_date("21/5"), None);
        assert_eq!(parse_compact_date("not/a/date"), None);
    }
}
