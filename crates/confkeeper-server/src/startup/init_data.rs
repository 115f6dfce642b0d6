//! First-boot data: the admin account and the default tenant.

use sea_orm::DatabaseConnection;

use confkeeper_auth::service::user;
use confkeeper_common::{ConfkeeperError, DEFAULT_TENANT_ID};
use confkeeper_config::service::tenant;

use crate::model::Configuration;

/// Ensure the admin user and the default tenant exist.
///
/// Safe to run on every start; records that already exist are left as they
/// are, including the admin password.
pub async fn init_data(
    db: &DatabaseConnection,
    configuration: &Configuration,
) -> anyhow::Result<()> {
    let username = configuration.admin_username();
    match user::create_user(db, &username, &configuration.admin_password()).await {
        Ok(()) => tracing::info!(username = %username, "admin user created"),
        Err(ConfkeeperError::AlreadyExists(_)) => {
            tracing::debug!(username = %username, "admin user already present")
        }
        Err(e) => return Err(e.into()),
    }

    match tenant::create_tenant(db, DEFAULT_TENANT_ID, DEFAULT_TENANT_ID, "Default tenant").await
    {
        Ok(_) => tracing::info!(tenant_id = DEFAULT_TENANT_ID, "default tenant created"),
        Err(ConfkeeperError::AlreadyExists(_)) => {
            tracing::debug!(tenant_id = DEFAULT_TENANT_ID, "default tenant already present")
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
