//! Configuration data models
//!
//! - Update and clone forms
//! - List filters
//! - Compaction reports

pub mod config;

pub use config::*;
