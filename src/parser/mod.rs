//! Snapshot parsers for the grid and popup page templates

pub mod grid;
pub mod markers;
pub mod popup;
pub mod text;

pub use grid::GridParser;
pub use popup::PopupParser;
