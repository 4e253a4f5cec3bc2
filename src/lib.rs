//! # almanac
//!
//! Mining pipeline for archived web-calendar snapshots. Given a manifest of
//! locally stored HTML captures, almanac classifies each page into a
//! template, partitions the manifest into per-template sub-manifests,
//! parses the grid and popup templates into raw event records, reconciles
//! those records into a deduplicated canonical event table with venue
//! bookings, and aggregates yearly activity analytics over the table.
//!
//! ## Pipeline stages
//!
//! - **partition**: classify every snapshot and split the master manifest
//! - **extract**: parse grids and popups, reconcile, persist the table
//! - **analyze**: aggregate the persisted table into report artifacts
//!
//! Each stage reads only persisted artifacts from the previous one, so
//! stages can be rerun independently and reruns are idempotent.

pub mod analytics;
pub mod classify;
pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod models;
pub mod parser;
pub mod reconcile;
pub mod storage;
pub mod utils;

pub use error::{Error, ErrorCategory, Result};
pub use models::{
    CanonicalEvent, CanonicalTable, ManifestEntry, PopupDetail, RawEventRecord, SourceType,
    VenueBooking,
};
