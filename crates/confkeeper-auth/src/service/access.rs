//! Access decisions
//!
//! No roles or grants are cached. Each grant lookup is a single statement
//! that resolves the caller's roles in a sub-select, so a concurrent
//! `delete_role` is seen either entirely or not at all.

use std::collections::BTreeSet;

use confkeeper_common::{AccessLevel, ConfkeeperError, GrantAction, Result};
use confkeeper_persistence::entity::{permissions, roles};
use confkeeper_persistence::sea_orm::sea_query::SelectStatement;
use confkeeper_persistence::sea_orm::*;

use crate::model::Principal;

fn roles_of(username: &str) -> SelectStatement {
    roles::Entity::find()
        .select_only()
        .column(roles::Column::Role)
        .filter(roles::Column::Username.eq(username))
        .into_query()
}

async fn grant_exists<C>(
    db: &C,
    username: &str,
    tenant_id: &str,
    actions: &[GrantAction],
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = permissions::Entity::find()
        .select_only()
        .column(permissions::Column::Role)
        .filter(permissions::Column::Role.in_subquery(roles_of(username)))
        .filter(permissions::Column::Resource.eq(tenant_id))
        .filter(permissions::Column::Action.is_in(actions.iter().map(|a| a.as_str())))
        .into_tuple::<String>()
        .one(db)
        .await?;

    Ok(result.is_some())
}

fn collect_actions(raw: Vec<String>) -> BTreeSet<GrantAction> {
    raw.into_iter()
        .filter_map(|action| match action.parse::<GrantAction>() {
            Ok(action) => Some(action),
            Err(e) => {
                tracing::warn!("ignoring stored grant: {}", e);
                None
            }
        })
        .collect()
}

/// Roles assigned to `username`; empty when there are none
pub async fn list_roles<C>(db: &C, username: &str) -> Result<BTreeSet<String>>
where
    C: ConnectionTrait,
{
    let roles = roles::Entity::find()
        .select_only()
        .column(roles::Column::Role)
        .filter(roles::Column::Username.eq(username))
        .into_tuple::<String>()
        .all(db)
        .await?;

    Ok(roles.into_iter().collect())
}

/// Decide whether `principal` may access `tenant_id` at `required` level
pub async fn evaluate_access<C>(
    db: &C,
    principal: &Principal,
    tenant_id: &str,
    required: AccessLevel,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    if principal.super_admin {
        return Ok(true);
    }

    let username = principal.username.as_str();
    if list_roles(db, username).await?.is_empty() {
        tracing::debug!(username, tenant_id, "no roles assigned");
        return Ok(false);
    }

    let permitted = match required {
        AccessLevel::Read => {
            grant_exists(
                db,
                username,
                tenant_id,
                &[GrantAction::Read, GrantAction::ReadWrite],
            )
            .await?
        }
        AccessLevel::Write => {
            grant_exists(db, username, tenant_id, &[GrantAction::ReadWrite]).await?
                || grant_exists(db, username, tenant_id, &[GrantAction::Write]).await?
        }
    };

    tracing::debug!(username, tenant_id, required = %required, permitted, "access evaluated");

    Ok(permitted)
}

/// `evaluate_access` for handlers: a deny becomes `Forbidden`
pub async fn check_access<C>(
    db: &C,
    principal: &Principal,
    tenant_id: &str,
    required: AccessLevel,
) -> Result<()>
where
    C: ConnectionTrait,
{
    if evaluate_access(db, principal, tenant_id, required).await? {
        return Ok(());
    }

    tracing::warn!(
        username = %principal.username,
        tenant_id,
        required = %required,
        "access denied"
    );

    Err(ConfkeeperError::forbidden(format!(
        "user '{}' has no '{}' access to tenant '{}'",
        principal.username, required, tenant_id
    )))
}

/// Actions granted to `username` on `tenant_id` through any of its roles
pub async fn list_granted_actions<C>(
    db: &C,
    username: &str,
    tenant_id: &str,
) -> Result<BTreeSet<GrantAction>>
where
    C: ConnectionTrait,
{
    let raw = permissions::Entity::find()
        .select_only()
        .column(permissions::Column::Action)
        .filter(permissions::Column::Role.in_subquery(roles_of(username)))
        .filter(permissions::Column::Resource.eq(tenant_id))
        .into_tuple::<String>()
        .all(db)
        .await?;

    Ok(collect_actions(raw))
}
