//! Compaction of superseded config versions
//!
//! Keeps only the latest version of every key that advanced past version 1.
//! Each key is compacted in its own transaction holding the key's lock row,
//! and its max version is re-read under that lock, so an append that commits
//! first is never deleted and one that commits later only adds a version.

use sea_orm::{prelude::Expr, *};

use confkeeper_common::Result;
use confkeeper_persistence::entity::config_info;
use confkeeper_persistence::{ConfigKey, acquire_key_lock};

use crate::model::CompactionReport;
use crate::service::config::{key_condition, max_version};

async fn candidate_keys(db: &DatabaseConnection) -> Result<Vec<ConfigKey>> {
    let keys = config_info::Entity::find()
        .select_only()
        .columns([
            config_info::Column::DataId,
            config_info::Column::GroupId,
            config_info::Column::TenantId,
        ])
        .group_by(config_info::Column::DataId)
        .group_by(config_info::Column::GroupId)
        .group_by(config_info::Column::TenantId)
        .having(Expr::expr(config_info::Column::Version.max()).gt(1))
        .into_tuple::<(String, String, String)>()
        .all(db)
        .await?
        .into_iter()
        .map(|(data_id, group_id, tenant_id)| ConfigKey::new(data_id, group_id, tenant_id))
        .collect();

    Ok(keys)
}

/// Delete all but the latest version of `key`, returning the rows removed
pub async fn compact_key(db: &DatabaseConnection, key: &ConfigKey) -> Result<u64> {
    let tx = db.begin().await?;
    acquire_key_lock(&tx, key).await?;

    let max = max_version(&tx, key).await?;
    if max <= 1 {
        tx.commit().await?;
        return Ok(0);
    }

    let removed = config_info::Entity::delete_many()
        .filter(key_condition(key))
        .filter(config_info::Column::Version.lt(max))
        .exec(&tx)
        .await?
        .rows_affected;

    tx.commit().await?;

    tracing::debug!(key = %key, kept = max, removed, "config compacted");

    Ok(removed)
}

/// Compact every key whose max version is above 1
pub async fn compact(db: &DatabaseConnection) -> Result<CompactionReport> {
    let mut report = CompactionReport::default();

    for key in candidate_keys(db).await? {
        let removed = compact_key(db, &key).await?;
        if removed > 0 {
            report.keys_compacted += 1;
            report.records_removed += removed;
        }
    }

    tracing::info!(
        keys = report.keys_compacted,
        removed = report.records_removed,
        "compaction finished"
    );

    Ok(report)
}
