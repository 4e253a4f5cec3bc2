//! Canonical naming for events and venues
//!
//! The canonical title is deliberately lossier than the normalized title
//! used for dedup comparisons: host suffixes and punctuation are removed,
//! then known misspellings are repaired through the alias table. Two raw
//! titles that differ only in host or spelling collapse to one program
//! name here, while remaining distinct identities upstream.

use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::parser::text::clean;

lazy_static! {
    /// Everything from the word "host" onward is organizer info, not title
    static ref HOST_SUFFIX_RE: Regex = Regex::new(r"\bhost\b.*$").unwrap();
    static ref PUNCT_RE: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug, Deserialize)]
struct AliasFile {
    #[serde(default)]
    aliases: HashMap<String, String>,
}

/// Maps canonicalized-but-misspelled titles to their repaired forms
#[derive(Debug, Clone)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let mut aliases = HashMap::new();
        for (from, to) in [
            ("arabic scool at bilal", "arabic school at bilal"),
            ("arabic scool", "arabic school"),
        ] {
            aliases.insert(from.to_string(), to.to_string());
        }
        Self { aliases }
    }
}

impl AliasTable {
    /// Load extra aliases from a TOML file's `[aliases]` table, layered over
    /// the built-in repairs.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: AliasFile = toml::from_str(&content)
            .map_err(|e| Error::config(format!("invalid alias file {}: {e}", path.display())))?;

        let mut table = Self::default();
        table.aliases.extend(file.aliases);
        Ok(table)
    }

    pub fn resolve<'a>(&'a self, title: &'a str) -> &'a str {
        self.aliases.get(title).map(String::as_str).unwrap_or(title)
    }
}

/// Canonical program name for a raw title: lowercased, host suffix removed,
/// punctuation folded to spaces, whitespace collapsed, aliases applied.
pub fn canonical_title(title: &str, aliases: &AliasTable) -> String {
    let lowered = clean(title).to_lowercase();
    let without_host = HOST_SUFFIX_RE.replace(&lowered, "");
    let without_punct = PUNCT_RE.replace_all(&without_host, " ");
    let collapsed = WHITESPACE_RE
        .replace_all(&without_punct, " ")
        .trim()
        .to_string();
    aliases.resolve(&collapsed).to_string()
}

/// Canonical venue code: cleaned, with the `c_` style prefix dropped. Unlike
/// the parser-side normalizer this returns an owned string so callers can
/// test for emptiness themselves.
pub fn canonical_location(location: &str) -> String {
    let cleaned = clean(location);
    if cleaned.to_lowercase().starts_with("c_") {
        cleaned[2..].to_string()
    } else {
        cleaned
    }
}

/// Stable event identity: `date||canonical title||lowercased time label`.
///
/// A missing time label contributes an empty final segment, so all-day
/// events still key deterministically.
pub fn event_key(date: &str, title_canonical: &str, time_label: Option<&str>) -> String {
    let time = time_label.map(clean).unwrap_or_default().to_lowercase();
    format!("{}||{}||{}", clean(date), title_canonical, time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_title_host_and_alias() {
        let aliases = AliasTable::default();
        assert_eq!(
            canonical_title("Arabic Scool at Bilal Host John Doe", &aliases),
            "arabic school at bilal"
        );
    }

    #[test]
    fn test_canonical_title_punctuation_folds_to_space() {
        let aliases = AliasTable::default();
        assert_eq!(canonical_title("Youth-Night: Games!", &aliases), "youth night games");
    }

    #[test]
    fn test_canonical_title_host_mid_word_untouched() {
        let aliases = AliasTable::default();
        assert_eq!(canonical_title("Ghost Stories", &aliases), "ghost stories");
    }

    #[test]
    fn test_canonical_title_idempotent() {
        let aliases = AliasTable::default();
        let once = canonical_title("Arabic Scool Host X", &aliases);
        assert_eq!(canonical_title(&once, &aliases), once);
    }

    #[test]
    fn test_alias_file_layered_over_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("aliases.toml");
        std::fs::write(&path, "[aliases]\n\"quran stdy\" = \"quran study\"\n").unwrap();

        let table = AliasTable::from_file(&path).unwrap();
        assert_eq!(table.resolve("quran stdy"), "quran study");
        assert_eq!(table.resolve("arabic scool"), "arabic school");
        assert_eq!(table.resolve("unknown"), "unknown");
    }

    #[test]
    fn test_canonical_location() {
        assert_eq!(canonical_location("c_Masjid"), "Masjid");
        assert_eq!(canonical_location(" Gym "), "Gym");
        assert_eq!(canonical_location("c_"), "");
    }

    #[test]
    fn test_event_key_shape() {
        assert_eq!(
            event_key("2021-05-21", "friday prayer", Some("1:00 PM")),
            "2021-05-21||friday prayer||1:00 pm"
        );
        assert_eq!(event_key("2021-05-21", "eid", None), "2021-05-21||eid||");
    }
}
