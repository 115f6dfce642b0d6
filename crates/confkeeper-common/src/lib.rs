//! Confkeeper Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all confkeeper components:
//! - Error taxonomy and error codes
//! - Access levels and grant actions for the permission model
//! - Config type / action whitelists
//! - Identifier validation helpers

pub mod error;
pub mod utils;

// Re-exports for convenience
pub use error::{ConfkeeperError, ErrorCode, Result};
pub use utils::{page_offset, validate_identifier, validate_page};

use serde::{Deserialize, Serialize};

/// Tenant created on first boot
pub const DEFAULT_TENANT_ID: &str = "default";

/// Maximum length of a dataId or groupId
pub const MAX_KEY_LENGTH: usize = 255;

/// Maximum length of a tenantId
pub const MAX_TENANT_LENGTH: usize = 128;

/// Maximum length of a username or role name
pub const MAX_NAME_LENGTH: usize = 50;

/// Config types accepted when no whitelist is configured
pub const DEFAULT_CONFIG_TYPES: &[&str] = &[
    "text",
    "json",
    "xml",
    "yaml",
    "html",
    "properties",
    "toml",
    "ini",
];

/// Grant actions accepted when no whitelist is configured
pub const DEFAULT_ACTION_TYPES: &[&str] = &["r", "w", "rw"];

/// Access level a caller requires on a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessLevel {
    #[default]
    Read,
    Write,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Read => "r",
            AccessLevel::Write => "w",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "r" => Ok(AccessLevel::Read),
            "w" => Ok(AccessLevel::Write),
            _ => Err(format!("Invalid access level: {}", s)),
        }
    }
}

/// Action stored on a permission grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GrantAction {
    #[serde(rename = "r")]
    Read,
    #[serde(rename = "w")]
    Write,
    #[serde(rename = "rw")]
    ReadWrite,
}

impl GrantAction {
    pub fn as_str(self) -> &'static str {
        match self {
            GrantAction::Read => "r",
            GrantAction::Write => "w",
            GrantAction::ReadWrite => "rw",
        }
    }

    /// Whether a grant with this action satisfies `level`
    pub fn satisfies(self, level: AccessLevel) -> bool {
        match level {
            AccessLevel::Read => matches!(self, GrantAction::Read | GrantAction::ReadWrite),
            AccessLevel::Write => matches!(self, GrantAction::Write | GrantAction::ReadWrite),
        }
    }
}

impl std::fmt::Display for GrantAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GrantAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "r" => Ok(GrantAction::Read),
            "w" => Ok(GrantAction::Write),
            "rw" => Ok(GrantAction::ReadWrite),
            _ => Err(format!("Invalid action: {}", s)),
        }
    }
}

/// Configured whitelists for config types and grant actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist {
    pub config_types: Vec<String>,
    pub action_types: Vec<String>,
}

impl Default for Whitelist {
    fn default() -> Self {
        Self {
            config_types: DEFAULT_CONFIG_TYPES.iter().map(|t| t.to_string()).collect(),
            action_types: DEFAULT_ACTION_TYPES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Whitelist {
    pub fn new(config_types: Vec<String>, action_types: Vec<String>) -> Self {
        Self {
            config_types,
            action_types,
        }
    }

    pub fn is_config_type_allowed(&self, config_type: &str) -> bool {
        self.config_types.iter().any(|t| t == config_type)
    }

    pub fn is_action_allowed(&self, action: &str) -> bool {
        self.action_types.iter().any(|a| a == action)
    }

    /// Reject a config type outside the whitelist
    pub fn check_config_type(&self, config_type: &str) -> Result<()> {
        if self.is_config_type_allowed(config_type) {
            Ok(())
        } else {
            Err(ConfkeeperError::validation(format!(
                "unsupported config type '{}'",
                config_type
            )))
        }
    }

    /// Reject an action outside the whitelist, otherwise parse it
    pub fn check_action(&self, action: &str) -> Result<GrantAction> {
        if !self.is_action_allowed(action) {
            return Err(ConfkeeperError::validation(format!(
                "unsupported action '{}'",
                action
            )));
        }
        action.parse::<GrantAction>().map_err(ConfkeeperError::validation)
    }
}
