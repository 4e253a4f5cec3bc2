//! Persistence for the canonical table and report artifacts

pub mod report;
pub mod table;

pub use report::write_report;
pub use table::{load_bookings, load_events, write_bookings, write_events, write_table};
