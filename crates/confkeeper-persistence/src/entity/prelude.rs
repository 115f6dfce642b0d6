pub use super::config_info::Entity as ConfigInfo;
pub use super::config_version_lock::Entity as ConfigVersionLock;
pub use super::permissions::Entity as Permissions;
pub use super::roles::Entity as Roles;
pub use super::tenant_info::Entity as TenantInfo;
pub use super::users::Entity as Users;
