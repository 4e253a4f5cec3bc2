//! Pipeline configuration
//!
//! Layered the usual way: built-in defaults, then an optional TOML file,
//! then `ALMANAC_*` environment overrides. Every section has serde defaults
//! so a partial file only names what it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Locations of the master manifest and the four sub-manifests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub master: PathBuf,
    pub month_block: PathBuf,
    pub day_block: PathBuf,
    pub event_popup: PathBuf,
    pub other: PathBuf,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            master: PathBuf::from("archive/manifest.json"),
            month_block: PathBuf::from("archive/manifest_month_block.json"),
            day_block: PathBuf::from("archive/manifest_day_block.json"),
            event_popup: PathBuf::from("archive/manifest_event_popup.json"),
            other: PathBuf::from("archive/manifest_other.json"),
        }
    }
}

/// Knobs for extraction and reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Restrict extraction to one named calendar; absent means all
    pub calendar_name: Option<String>,

    /// When set, day records only fill months without month-grid coverage
    pub coverage_gate: bool,

    /// Cap on manifest entries examined per run, for sampling
    pub limit: Option<usize>,

    /// Extra title aliases layered over the built-in repairs
    pub alias_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            calendar_name: None,
            coverage_gate: true,
            limit: None,
            alias_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("archive/out"),
        }
    }
}

impl OutputConfig {
    pub fn events_path(&self) -> PathBuf {
        self.dir.join("events.csv")
    }

    pub fn bookings_path(&self) -> PathBuf {
        self.dir.join("venue_bookings.csv")
    }

    pub fn report_dir(&self) -> PathBuf {
        self.dir.join("report")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub manifests: ManifestConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from a TOML file and apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::config(format!("invalid config {}: {e}", path.display())))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("ALMANAC_MASTER_MANIFEST") {
            self.manifests.master = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("ALMANAC_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("ALMANAC_CALENDAR_NAME") {
            self.pipeline.calendar_name = Some(v);
        }
        if let Ok(v) = std::env::var("ALMANAC_COVERAGE_GATE") {
            self.pipeline.coverage_gate = v != "0" && !v.eq_ignore_ascii_case("false");
        }
        if let Ok(v) = std::env::var("ALMANAC_LIMIT") {
            self.pipeline.limit = v.parse().ok();
        }
        if let Ok(v) = std::env::var("ALMANAC_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.limit == Some(0) {
            return Err(Error::config("pipeline.limit must be greater than zero"));
        }
        if self
            .pipeline
            .calendar_name
            .as_deref()
            .is_some_and(|n| n.trim().is_empty())
        {
            return Err(Error::config(
                "pipeline.calendar_name must be non-empty when set",
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(Error::config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }
}
