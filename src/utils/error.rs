//! Error types for the almanac pipeline
//!
//! This module defines the domain-specific error types used throughout the
//! application.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while classifying a snapshot document
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Document is a non-HTML XML document (feeds served as raw XML);
    /// classification is not attempted for these.
    #[error("Unsupported document: XML without an <html> root")]
    UnsupportedDocument,
}

/// Errors that can occur during event extraction.
///
/// Malformed markup never errors (a bad block degrades to a record with
/// absent fields); only missing inputs do.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Snapshot file referenced by a manifest entry could not be read
    #[error("Snapshot file unreadable: {0}")]
    UnreadableSnapshot(PathBuf),
}

/// Errors that can occur while reading or writing manifests
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Required manifest file is missing
    #[error("Missing manifest file: {0}")]
    Missing(PathBuf),

    /// Manifest JSON could not be parsed
    #[error("Malformed manifest {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// I/O failure while reading or writing a manifest
    #[error("Manifest I/O error: {0}")]
    Io(#[from] std::io::Error),
}
