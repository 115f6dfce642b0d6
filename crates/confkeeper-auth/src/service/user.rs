//! User service

use confkeeper_common::{ConfkeeperError, MAX_NAME_LENGTH, Result, validate_identifier};
use confkeeper_persistence::entity::users;
use confkeeper_persistence::is_unique_violation;
use confkeeper_persistence::sea_orm::*;

use crate::model::{DEFAULT_BCRYPT_COST, MAX_PASSWORD_LENGTH, UserInfo};

pub async fn find_user<C>(db: &C, username: &str) -> Result<Option<UserInfo>>
where
    C: ConnectionTrait,
{
    let user = users::Entity::find_by_id(username)
        .one(db)
        .await?
        .map(UserInfo::from);

    Ok(user)
}

pub async fn user_exists<C>(db: &C, username: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(users::Entity::find_by_id(username).one(db).await?.is_some())
}

pub async fn create_user(db: &DatabaseConnection, username: &str, password: &str) -> Result<()> {
    validate_identifier("username", username, MAX_NAME_LENGTH)?;
    if password.is_empty() || password.len() > MAX_PASSWORD_LENGTH {
        return Err(ConfkeeperError::validation(format!(
            "'password' must be 1 to {} bytes",
            MAX_PASSWORD_LENGTH
        )));
    }

    if user_exists(db, username).await? {
        return Err(ConfkeeperError::already_exists(format!(
            "user '{}'",
            username
        )));
    }

    let hashed_password = bcrypt::hash(password, DEFAULT_BCRYPT_COST)
        .map_err(|e| ConfkeeperError::validation(format!("failed to hash password: {}", e)))?;
    let entity = users::ActiveModel {
        username: Set(username.to_string()),
        password: Set(hashed_password),
        enabled: Set(true),
    };

    users::Entity::insert(entity)
        .exec_without_returning(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ConfkeeperError::already_exists(format!("user '{}'", username))
            } else {
                e.into()
            }
        })?;

    tracing::info!(username, "user created");

    Ok(())
}
