//! Confkeeper Auth - Authorization engine and access registry
//!
//! This crate provides:
//! - Access decisions for a principal on a tenant
//! - User accounts, role assignments and permission grants

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::*;
