//! Confkeeper Config - Versioned configuration store
//!
//! This crate provides:
//! - Append-only config versions with per-key version assignment
//! - Listing, retrieval, clone and delete operations
//! - Compaction of superseded versions
//! - Tenant management

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::*;
