//! CLI command implementations
//!
//! Thin orchestration over the library modules; all pipeline logic lives
//! below this layer so it stays testable without a terminal.

pub mod analyze;
pub mod extract;
pub mod partition;
pub mod run;
