//! Confkeeper Persistence - Database entities and persistence layer
//!
//! This crate provides:
//! - SeaORM entity definitions
//! - Domain model types shared by the store and the registry
//! - The per-key version lock and database error classification

pub mod entity;
pub mod lock;
pub mod model;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

pub use lock::{acquire_key_lock, is_unique_violation};

// Re-export model types
pub use model::{ConfigKey, ConfigRecord, Page, PermissionInfo, RoleInfo, TenantInfo, UserInfo};
