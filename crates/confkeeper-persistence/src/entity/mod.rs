//! SeaORM entity definitions
//!
//! One module per table. `prelude` re-exports the entity types.

pub mod prelude;

pub mod config_info;
pub mod config_version_lock;
pub mod permissions;
pub mod roles;
pub mod tenant_info;
pub mod users;
