//! Snapshot manifest reading, writing, and URL parameter extraction
//!
//! The downloader (an external collaborator) writes a JSON manifest of
//! `{timestamp, original, path}` records. Sub-manifests produced by the
//! [`partition`] module use the identical record shape, simply filtered.

pub mod partition;

pub use partition::{PartitionedManifests, Partitioner};

use std::collections::HashMap;
use std::path::Path;

use url::Url;

use crate::models::ManifestEntry;
use crate::utils::error::ManifestError;

/// Load a manifest from a JSON file.
///
/// # Errors
///
/// Returns [`ManifestError::Missing`] when the file does not exist (missing
/// input manifests are the one fatal setup error of the pipeline) and
/// [`ManifestError::Malformed`] when the JSON cannot be parsed.
pub fn load(path: &Path) -> Result<Vec<ManifestEntry>, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::Missing(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| ManifestError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Save a manifest as pretty-printed JSON, creating parent directories.
pub fn save(path: &Path, entries: &[ManifestEntry]) -> Result<(), ManifestError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(entries).map_err(|source| {
        ManifestError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    })?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Extract query parameters from a URL, keeping the first value per key.
///
/// Accepts both absolute URLs (manifest `original` fields) and relative ones
/// (hrefs inside snapshot markup). Unparseable input yields an empty map;
/// callers treat missing parameters as absent fields, never as errors.
pub fn query_params(url: &str) -> HashMap<String, String> {
    let parsed = Url::parse(url).or_else(|_| {
        // Relative href from snapshot markup; the base host is irrelevant,
        // only the query string is read.
        Url::parse("http://snapshot.invalid/").and_then(|base| base.join(url))
    });

    let mut params = HashMap::new();
    if let Ok(u) = parsed {
        for (k, v) in u.query_pairs() {
            params.entry(k.into_owned()).or_insert_with(|| v.into_owned());
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_query_params_absolute_url() {
        let params = query_params(
            "https://example.org/Calendar/Calcium40.php?CalendarName=Events&Op=ShowMonth&Date=2021/5/1",
        );
        assert_eq!(params.get("CalendarName").map(String::as_str), Some("Events"));
        assert_eq!(params.get("Op").map(String::as_str), Some("ShowMonth"));
        assert_eq!(params.get("Date").map(String::as_str), Some("2021/5/1"));
    }

    #[test]
    fn test_query_params_relative_href() {
        let params = query_params("Calcium40.php?Op=ShowIt&ID=899&Date=2021/5/21");
        assert_eq!(params.get("ID").map(String::as_str), Some("899"));
        assert_eq!(params.get("Date").map(String::as_str), Some("2021/5/21"));
    }

    #[test]
    fn test_query_params_first_value_wins() {
        let params = query_params("https://example.org/x?Op=ShowIt&Op=ShowDay");
        assert_eq!(params.get("Op").map(String::as_str), Some("ShowIt"));
    }

    #[test]
    fn test_query_params_garbage_is_empty() {
        assert!(query_params("").is_empty());
        assert!(query_params("://no").is_empty());
    }

    #[test]
    fn test_manifest_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        let entries = vec![
            ManifestEntry {
                timestamp: "20210521120000".to_string(),
                original: "https://example.org/cal.php?Op=ShowMonth".to_string(),
                path: Some("archive/202105/a.html".to_string()),
                ..Default::default()
            },
            ManifestEntry {
                timestamp: "20210522120000".to_string(),
                original: "https://example.org/cal.php?Op=ShowDay".to_string(),
                error: Some("HTTP 404".to_string()),
                ..Default::default()
            },
        ];

        save(&path, &entries).unwrap();
        let restored = load(&path).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0].timestamp, "20210521120000");
        assert_eq!(restored[1].error.as_deref(), Some("HTTP 404"));
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        let err = load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Missing(_)));
    }

    #[test]
    fn test_malformed_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json ]").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }
}
