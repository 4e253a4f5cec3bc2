//! Unified error handling for the almanac crate
//!
//! Domain-specific errors live in [`crate::utils::error`]; this module wraps
//! them in a single [`Error`] enum so pipeline stages can compose across
//! module boundaries without losing detail.
//!
//! Parsing-level failures are absorbed where they happen (a malformed event
//! block degrades to a record with absent fields, never an `Err`). The
//! variants here are the failures that are allowed to propagate: missing
//! input artifacts, malformed manifests, and I/O.

use std::io;
use thiserror::Error;

pub use crate::utils::error::{ClassifyError, ManifestError, ParseError};

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Snapshot classification errors
    Classification,
    /// Parsing and data extraction errors
    Parsing,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the almanac crate
#[derive(Error, Debug)]
pub enum Error {
    /// Classifier refused the document
    #[error("Classify error: {0}")]
    Classify(#[from] ClassifyError),

    /// Extraction errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Manifest reading/writing errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Classify(_) => ErrorCategory::Classification,
            Self::Parse(_) | Self::Json(_) => ErrorCategory::Parsing,
            Self::Manifest(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

// Conversion from anyhow::Error, used at the storage boundary
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
