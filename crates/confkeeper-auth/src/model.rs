//! Authorization models
//!
//! The registry types (`RoleInfo`, `PermissionInfo`, `UserInfo`) live in the
//! persistence crate and are re-exported here for handler convenience.

use serde::{Deserialize, Serialize};

pub use confkeeper_persistence::model::{PermissionInfo, RoleInfo, UserInfo};

/// bcrypt cost used for stored password hashes
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// bcrypt only considers the first 72 bytes of a password
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Authenticated identity making a request
///
/// `super_admin` is resolved by the transport layer; the engine trusts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub username: String,
    #[serde(default)]
    pub super_admin: bool,
}

impl Principal {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            super_admin: false,
        }
    }

    pub fn super_admin(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            super_admin: true,
        }
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
