//! Tenant service layer
//!
//! Tenants scope configs and permission grants. A tenant cannot be deleted
//! while configs still reference it; grants naming it are left in place.

use sea_orm::{prelude::Expr, sea_query::Asterisk, *};

use confkeeper_common::{ConfkeeperError, MAX_TENANT_LENGTH, Result, validate_identifier};
use confkeeper_persistence::entity::{config_info, tenant_info};
use confkeeper_persistence::{TenantInfo, is_unique_violation};

async fn find_tenant<C>(db: &C, tenant_id: &str) -> Result<Option<tenant_info::Model>>
where
    C: ConnectionTrait,
{
    let tenant = tenant_info::Entity::find()
        .filter(tenant_info::Column::TenantId.eq(tenant_id))
        .one(db)
        .await?;

    Ok(tenant)
}

/// Number of config records stored under `tenant_id`
pub async fn config_count<C>(db: &C, tenant_id: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    let count = config_info::Entity::find()
        .select_only()
        .column_as(Expr::col(Asterisk).count(), "count")
        .filter(config_info::Column::TenantId.eq(tenant_id))
        .into_tuple::<i64>()
        .one(db)
        .await?
        .unwrap_or_default() as u64;

    Ok(count)
}

pub async fn create_tenant(
    db: &DatabaseConnection,
    tenant_id: &str,
    tenant_name: &str,
    tenant_desc: &str,
) -> Result<TenantInfo> {
    validate_identifier("tenantId", tenant_id, MAX_TENANT_LENGTH)?;

    if find_tenant(db, tenant_id).await?.is_some() {
        return Err(ConfkeeperError::already_exists(format!(
            "tenant '{}'",
            tenant_id
        )));
    }

    let now = chrono::Utc::now().timestamp_millis();
    let entity = tenant_info::ActiveModel {
        tenant_id: Set(tenant_id.to_string()),
        tenant_name: Set(tenant_name.to_string()),
        tenant_desc: Set(Some(tenant_desc.to_string())),
        gmt_create: Set(now),
        gmt_modified: Set(now),
        ..Default::default()
    };

    let model = entity.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            ConfkeeperError::already_exists(format!("tenant '{}'", tenant_id))
        } else {
            e.into()
        }
    })?;

    tracing::info!(tenant_id, "tenant created");

    Ok(TenantInfo::from(model))
}

pub async fn get_tenant(db: &DatabaseConnection, tenant_id: &str) -> Result<TenantInfo> {
    find_tenant(db, tenant_id)
        .await?
        .map(TenantInfo::from)
        .ok_or_else(|| ConfkeeperError::not_found(format!("tenant '{}'", tenant_id)))
}

pub async fn list_tenants(db: &DatabaseConnection) -> Result<Vec<TenantInfo>> {
    let tenants = tenant_info::Entity::find()
        .order_by_asc(tenant_info::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(TenantInfo::from)
        .collect();

    Ok(tenants)
}

pub async fn tenant_exists(db: &DatabaseConnection, tenant_id: &str) -> Result<bool> {
    Ok(find_tenant(db, tenant_id).await?.is_some())
}

/// Delete an empty tenant
pub async fn delete_tenant(db: &DatabaseConnection, tenant_id: &str) -> Result<()> {
    let tx = db.begin().await?;

    if find_tenant(&tx, tenant_id).await?.is_none() {
        return Err(ConfkeeperError::not_found(format!("tenant '{}'", tenant_id)));
    }

    let configs = config_count(&tx, tenant_id).await?;
    if configs > 0 {
        tracing::warn!(tenant_id, configs, "tenant still has configs");
        return Err(ConfkeeperError::conflict(format!(
            "tenant '{}' still has {} config records",
            tenant_id, configs
        )));
    }

    tenant_info::Entity::delete_many()
        .filter(tenant_info::Column::TenantId.eq(tenant_id))
        .exec(&tx)
        .await?;

    tx.commit().await?;

    tracing::info!(tenant_id, "tenant deleted");

    Ok(())
}
