//! Configuration service layer
//!
//! - Config versions: create, append, read, list, clone, delete
//! - Compaction of superseded versions
//! - Tenant management

pub mod compaction;
pub mod config;
pub mod tenant;

pub use compaction::compact;
pub use config::*;
