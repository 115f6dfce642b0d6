//! Role service
//!
//! Roles have no table of their own. A role exists while some user is
//! assigned to it, and deleting it removes its grants in the same
//! transaction.

use confkeeper_common::{
    ConfkeeperError, MAX_NAME_LENGTH, Result, page_offset, validate_identifier,
};
use confkeeper_persistence::entity::{permissions, roles};
use confkeeper_persistence::sea_orm::prelude::Expr;
use confkeeper_persistence::sea_orm::sea_query::Asterisk;
use confkeeper_persistence::sea_orm::*;
use confkeeper_persistence::{Page, is_unique_violation};

use crate::model::RoleInfo;
use crate::service::user;

/// Whether any user is assigned to `role`
pub async fn role_exists<C>(db: &C, role: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = roles::Entity::find()
        .select_only()
        .column(roles::Column::Role)
        .filter(roles::Column::Role.eq(role))
        .into_tuple::<String>()
        .one(db)
        .await?;

    Ok(result.is_some())
}

pub async fn create_role(db: &DatabaseConnection, username: &str, role: &str) -> Result<()> {
    validate_identifier("role", role, MAX_NAME_LENGTH)?;

    if !user::user_exists(db, username).await? {
        return Err(ConfkeeperError::not_found(format!("user '{}'", username)));
    }
    if roles::Entity::find_by_id((username.to_owned(), role.to_owned()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(ConfkeeperError::already_exists(format!(
            "user '{}' bound to the role '{}'",
            username, role
        )));
    }

    let entity = roles::ActiveModel {
        username: Set(username.to_owned()),
        role: Set(role.to_owned()),
    };

    roles::Entity::insert(entity)
        .exec_without_returning(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ConfkeeperError::already_exists(format!(
                    "user '{}' bound to the role '{}'",
                    username, role
                ))
            } else {
                e.into()
            }
        })?;

    tracing::info!(username, role, "role assigned");

    Ok(())
}

/// Remove every grant and every assignment of `role` atomically
pub async fn delete_role(db: &DatabaseConnection, role: &str) -> Result<()> {
    let tx = db.begin().await?;

    let grants = permissions::Entity::delete_many()
        .filter(permissions::Column::Role.eq(role))
        .exec(&tx)
        .await?
        .rows_affected;
    let assignments = roles::Entity::delete_many()
        .filter(roles::Column::Role.eq(role))
        .exec(&tx)
        .await?
        .rows_affected;

    tx.commit().await?;

    tracing::info!(role, grants, assignments, "role deleted");

    Ok(())
}

pub async fn search_roles(
    db: &DatabaseConnection,
    username: &str,
    role: &str,
    page_no: u64,
    page_size: u64,
) -> Result<Page<RoleInfo>> {
    let offset = page_offset(page_no, page_size)?;

    let mut select = roles::Entity::find();

    if !username.is_empty() {
        select = select.filter(roles::Column::Username.contains(username));
    }
    if !role.is_empty() {
        select = select.filter(roles::Column::Role.contains(role));
    }

    let total_count = select
        .clone()
        .select_only()
        .column_as(Expr::col(Asterisk).count(), "count")
        .into_tuple::<i64>()
        .one(db)
        .await?
        .unwrap_or_default() as u64;

    if total_count == 0 {
        return Ok(Page::empty());
    }

    let page_items = select
        .order_by_asc(roles::Column::Role)
        .order_by_asc(roles::Column::Username)
        .offset(offset)
        .limit(page_size)
        .all(db)
        .await?
        .into_iter()
        .map(RoleInfo::from)
        .collect();

    Ok(Page::new(total_count, page_no, page_size, page_items))
}
