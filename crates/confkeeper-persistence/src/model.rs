//! Domain model types returned by the store and the registry
//!
//! These types are decoupled from the SeaORM entities so callers never see
//! column naming.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use confkeeper_common::{MAX_KEY_LENGTH, MAX_TENANT_LENGTH, Result, validate_identifier};

use crate::entity::{config_info, permissions, roles, tenant_info, users};

/// Identity of a configuration document
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigKey {
    pub data_id: String,
    pub group_id: String,
    pub tenant_id: String,
}

impl ConfigKey {
    pub fn new(
        data_id: impl Into<String>,
        group_id: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            data_id: data_id.into(),
            group_id: group_id.into(),
            tenant_id: tenant_id.into(),
        }
    }

    /// Reject empty, oversized or non-printable key components
    pub fn validate(&self) -> Result<()> {
        validate_identifier("dataId", &self.data_id, MAX_KEY_LENGTH)?;
        validate_identifier("groupId", &self.group_id, MAX_KEY_LENGTH)?;
        validate_identifier("tenantId", &self.tenant_id, MAX_TENANT_LENGTH)
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}+{}", self.data_id, self.group_id, self.tenant_id)
    }
}

/// One immutable version of a configuration document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    pub id: i64,
    pub data_id: String,
    pub group_id: String,
    pub tenant_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub config_type: String,
    pub version: i32,
    pub author: String,
    pub created_at: NaiveDateTime,
}

impl ConfigRecord {
    pub fn key(&self) -> ConfigKey {
        ConfigKey::new(&self.data_id, &self.group_id, &self.tenant_id)
    }
}

impl From<config_info::Model> for ConfigRecord {
    fn from(value: config_info::Model) -> Self {
        Self {
            id: value.id,
            data_id: value.data_id,
            group_id: value.group_id,
            tenant_id: value.tenant_id,
            content: value.content,
            config_type: value.r#type,
            version: value.version,
            author: value.author,
            created_at: value.gmt_create,
        }
    }
}

/// Basic user information, password is the bcrypt hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub password: String,
    pub enabled: bool,
}

impl From<users::Model> for UserInfo {
    fn from(value: users::Model) -> Self {
        Self {
            username: value.username,
            password: value.password,
            enabled: value.enabled,
        }
    }
}

/// Role assignment information
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInfo {
    pub role: String,
    pub username: String,
}

impl From<roles::Model> for RoleInfo {
    fn from(value: roles::Model) -> Self {
        Self {
            role: value.role,
            username: value.username,
        }
    }
}

/// Permission information
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionInfo {
    pub role: String,
    pub resource: String,
    pub action: String,
}

impl From<permissions::Model> for PermissionInfo {
    fn from(value: permissions::Model) -> Self {
        Self {
            role: value.role,
            resource: value.resource,
            action: value.action,
        }
    }
}

/// Tenant information
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInfo {
    pub tenant_id: String,
    pub tenant_name: String,
    pub tenant_desc: String,
    pub created_time: i64,
    pub modified_time: i64,
}

impl From<tenant_info::Model> for TenantInfo {
    fn from(value: tenant_info::Model) -> Self {
        Self {
            tenant_id: value.tenant_id,
            tenant_name: value.tenant_name,
            tenant_desc: value.tenant_desc.unwrap_or_default(),
            created_time: value.gmt_create,
            modified_time: value.gmt_modified,
        }
    }
}

/// Generic paginated result
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: u64,
    pub page_number: u64,
    pub pages_available: u64,
    pub page_items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total_count: u64, page_number: u64, page_size: u64, page_items: Vec<T>) -> Self {
        Self {
            total_count,
            page_number,
            pages_available: if page_size > 0 {
                total_count.div_ceil(page_size)
            } else {
                0
            },
            page_items,
        }
    }

    pub fn empty() -> Self {
        Self {
            total_count: 0,
            page_number: 0,
            pages_available: 0,
            page_items: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = Page::new(11, 2, 5, vec![1, 2, 3, 4, 5]);
        assert_eq!(page.total_count, 11);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.pages_available, 3);
        assert_eq!(page.page_items.len(), 5);

        let page: Page<i32> = Page::new(10, 1, 5, vec![]);
        assert_eq!(page.pages_available, 2);

        let page: Page<i32> = Page::new(10, 1, 0, vec![]);
        assert_eq!(page.pages_available, 0);
    }

    #[test]
    fn test_page_empty() {
        let page: Page<String> = Page::empty();
        assert_eq!(page.total_count, 0);
        assert!(page.page_items.is_empty());
    }

    #[test]
    fn test_config_key_validate() {
        assert!(ConfigKey::new("app.yaml", "DEFAULT_GROUP", "default").validate().is_ok());
        assert!(ConfigKey::new("", "DEFAULT_GROUP", "default").validate().is_err());
        assert!(ConfigKey::new("app.yaml", " ", "default").validate().is_err());
        assert!(
            ConfigKey::new("app.yaml", "g", "t".repeat(MAX_TENANT_LENGTH + 1))
                .validate()
                .is_err()
        );
        assert_eq!(
            ConfigKey::new("app.yaml", "g", "default").to_string(),
            "app.yaml+g+default"
        );
    }

    #[test]
    fn test_config_record_from_model() {
        let created = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let record = ConfigRecord::from(config_info::Model {
            id: 7,
            data_id: "app.yaml".to_string(),
            group_id: "g".to_string(),
            tenant_id: "t1".to_string(),
            content: "a: 1".to_string(),
            r#type: "yaml".to_string(),
            version: 3,
            author: "alice".to_string(),
            gmt_create: created,
        });

        assert_eq!(record.config_type, "yaml");
        assert_eq!(record.key(), ConfigKey::new("app.yaml", "g", "t1"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "yaml");
        assert_eq!(json["dataId"], "app.yaml");
    }

    #[test]
    fn test_tenant_info_default_desc() {
        let info = TenantInfo::from(tenant_info::Model {
            id: 1,
            tenant_id: "t1".to_string(),
            tenant_name: "Tenant 1".to_string(),
            tenant_desc: None,
            gmt_create: 1,
            gmt_modified: 2,
        });
        assert_eq!(info.tenant_desc, "");
        assert_eq!(info.modified_time, 2);
    }
}
