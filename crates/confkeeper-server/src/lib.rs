//! Confkeeper Server - process wiring for the config store
//!
//! Loads configuration, installs logging, connects and migrates the database,
//! seeds first-boot data and schedules compaction.

pub mod model;
pub mod startup;
