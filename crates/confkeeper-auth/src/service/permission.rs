//! Permission service

use confkeeper_common::{ConfkeeperError, Result, Whitelist, page_offset};
use confkeeper_persistence::entity::{permissions, tenant_info};
use confkeeper_persistence::sea_orm::*;
use confkeeper_persistence::{Page, is_unique_violation};

use crate::model::PermissionInfo;
use crate::service::role;

pub async fn find_permission(
    db: &DatabaseConnection,
    role: &str,
    resource: &str,
    action: &str,
) -> Result<Option<PermissionInfo>> {
    let permission = permissions::Entity::find_by_id((
        role.to_string(),
        resource.to_string(),
        action.to_string(),
    ))
    .one(db)
    .await?
    .map(PermissionInfo::from);

    Ok(permission)
}

/// Grant `action` on tenant `resource` to `role`.
///
/// Checks run in order: role exists, action allowed, tenant exists, grant new.
pub async fn create_permission(
    db: &DatabaseConnection,
    whitelist: &Whitelist,
    role: &str,
    resource: &str,
    action: &str,
) -> Result<()> {
    if !role::role_exists(db, role).await? {
        return Err(ConfkeeperError::not_found(format!("role '{}'", role)));
    }

    let action = whitelist.check_action(action)?;

    let tenant = tenant_info::Entity::find()
        .filter(tenant_info::Column::TenantId.eq(resource))
        .one(db)
        .await?;
    if tenant.is_none() {
        return Err(ConfkeeperError::not_found(format!("tenant '{}'", resource)));
    }

    if find_permission(db, role, resource, action.as_str())
        .await?
        .is_some()
    {
        return Err(ConfkeeperError::already_exists(format!(
            "permission '{}:{}:{}'",
            role, resource, action
        )));
    }

    let entity = permissions::ActiveModel {
        role: Set(role.to_owned()),
        resource: Set(resource.to_owned()),
        action: Set(action.as_str().to_owned()),
    };

    permissions::Entity::insert(entity)
        .exec_without_returning(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ConfkeeperError::already_exists(format!(
                    "permission '{}:{}:{}'",
                    role, resource, action
                ))
            } else {
                e.into()
            }
        })?;

    tracing::info!(role, resource, action = %action, "permission granted");

    Ok(())
}

pub async fn delete_permission(
    db: &DatabaseConnection,
    role: &str,
    resource: &str,
    action: &str,
) -> Result<()> {
    let result =
        permissions::Entity::delete_by_id((role.to_owned(), resource.to_owned(), action.to_owned()))
            .exec(db)
            .await?;

    if result.rows_affected == 0 {
        return Err(ConfkeeperError::not_found(format!(
            "permission '{}:{}:{}'",
            role, resource, action
        )));
    }

    tracing::info!(role, resource, action, "permission revoked");

    Ok(())
}

pub async fn search_permissions(
    db: &DatabaseConnection,
    role: &str,
    page_no: u64,
    page_size: u64,
) -> Result<Page<PermissionInfo>> {
    let offset = page_offset(page_no, page_size)?;

    let mut select = permissions::Entity::find();

    if !role.is_empty() {
        select = select.filter(permissions::Column::Role.contains(role));
    }

    let total_count = select.clone().count(db).await?;

    if total_count == 0 {
        return Ok(Page::empty());
    }

    let page_items = select
        .order_by_asc(permissions::Column::Role)
        .order_by_asc(permissions::Column::Resource)
        .order_by_asc(permissions::Column::Action)
        .offset(offset)
        .limit(page_size)
        .all(db)
        .await?
        .into_iter()
        .map(PermissionInfo::from)
        .collect();

    Ok(Page::new(total_count, page_no, page_size, page_items))
}
