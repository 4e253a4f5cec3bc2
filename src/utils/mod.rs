//! Common utilities and helpers

pub mod error;
