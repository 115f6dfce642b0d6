//! Per-key version lock and database error classification
//!
//! Every writer of a key runs inside a transaction that first takes the key's
//! lock row. The row is created on demand and locked with `FOR UPDATE`, so
//! the max-version read that follows cannot interleave with another writer.
//! Lock rows outlive the records of their key.
//!
//! SQLite has no row locks and the `FOR UPDATE` clause is not emitted there.
//! On SQLite the insert-or-ignore that opens the transaction takes the
//! database write lock instead, which holds every other writer until commit.
//! The insert must therefore stay the first statement of the transaction.

use sea_orm::{sea_query::OnConflict, *};

use crate::entity::config_version_lock;
use crate::model::ConfigKey;

/// Take the lock row for `key` on the connection `conn`.
///
/// `conn` must be a transaction; the lock is released on commit or rollback.
pub async fn acquire_key_lock<C>(conn: &C, key: &ConfigKey) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let marker = config_version_lock::ActiveModel {
        data_id: Set(key.data_id.clone()),
        group_id: Set(key.group_id.clone()),
        tenant_id: Set(key.tenant_id.clone()),
        gmt_create: Set(chrono::Local::now().naive_local()),
    };

    config_version_lock::Entity::insert(marker)
        .on_conflict(
            OnConflict::columns([
                config_version_lock::Column::DataId,
                config_version_lock::Column::GroupId,
                config_version_lock::Column::TenantId,
            ])
            .do_nothing_on([config_version_lock::Column::DataId])
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    lock_row(key).one(conn).await?;

    tracing::trace!(key = %key, "acquired version lock");

    Ok(())
}

fn lock_row(key: &ConfigKey) -> Select<config_version_lock::Entity> {
    config_version_lock::Entity::find()
        .filter(config_version_lock::Column::DataId.eq(key.data_id.as_str()))
        .filter(config_version_lock::Column::GroupId.eq(key.group_id.as_str()))
        .filter(config_version_lock::Column::TenantId.eq(key.tenant_id.as_str()))
        .lock_exclusive()
}

/// Whether the store rejected a write because of a unique index
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
