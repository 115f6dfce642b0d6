//! Configuration service layer
//!
//! Every publish inserts a new immutable row. Writers of a key serialize on
//! the key's lock row (see `confkeeper_persistence::lock`), read the current
//! max version under that lock and insert max + 1 in the same transaction.
//! The unique (dataId, groupId, tenantId, version) index backs this up.

use std::collections::{BTreeSet, HashMap};

use chrono::Local;
use sea_orm::*;

use confkeeper_common::{ConfkeeperError, Result, Whitelist, page_offset};
use confkeeper_persistence::entity::config_info;
use confkeeper_persistence::{
    ConfigKey, ConfigRecord, Page, acquire_key_lock, is_unique_violation,
};

use crate::model::{CloneItem, ConfigUpdate, ListFilter};

pub(crate) fn key_condition(key: &ConfigKey) -> Condition {
    Condition::all()
        .add(config_info::Column::DataId.eq(key.data_id.as_str()))
        .add(config_info::Column::GroupId.eq(key.group_id.as_str()))
        .add(config_info::Column::TenantId.eq(key.tenant_id.as_str()))
}

pub(crate) async fn max_version<C>(conn: &C, key: &ConfigKey) -> Result<i32>
where
    C: ConnectionTrait,
{
    let max = config_info::Entity::find()
        .select_only()
        .column_as(config_info::Column::Version.max(), "max_version")
        .filter(key_condition(key))
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await?
        .flatten()
        .unwrap_or(0);

    Ok(max)
}

async fn find_latest<C>(conn: &C, key: &ConfigKey) -> Result<Option<config_info::Model>>
where
    C: ConnectionTrait,
{
    let latest = config_info::Entity::find()
        .filter(key_condition(key))
        .order_by_desc(config_info::Column::Version)
        .one(conn)
        .await?;

    Ok(latest)
}

async fn insert_version<C>(
    conn: &C,
    key: &ConfigKey,
    content: String,
    config_type: String,
    version: i32,
    author: &str,
) -> std::result::Result<config_info::Model, DbErr>
where
    C: ConnectionTrait,
{
    config_info::ActiveModel {
        data_id: Set(key.data_id.clone()),
        group_id: Set(key.group_id.clone()),
        tenant_id: Set(key.tenant_id.clone()),
        content: Set(content),
        r#type: Set(config_type),
        version: Set(version),
        author: Set(author.to_string()),
        gmt_create: Set(Local::now().naive_local()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

// Insert version 1 of `key`; the caller owns the transaction
async fn create_in<C>(
    conn: &C,
    key: &ConfigKey,
    content: String,
    config_type: String,
    author: &str,
) -> Result<ConfigRecord>
where
    C: ConnectionTrait,
{
    acquire_key_lock(conn, key).await?;

    if max_version(conn, key).await? > 0 {
        return Err(ConfkeeperError::already_exists(format!("config '{}'", key)));
    }

    let model = insert_version(conn, key, content, config_type, 1, author)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ConfkeeperError::already_exists(format!("config '{}'", key))
            } else {
                e.into()
            }
        })?;

    Ok(ConfigRecord::from(model))
}

/// Publish the first version of a new key
pub async fn create(
    db: &DatabaseConnection,
    whitelist: &Whitelist,
    key: &ConfigKey,
    content: &str,
    config_type: &str,
    author: &str,
) -> Result<ConfigRecord> {
    key.validate()?;
    whitelist.check_config_type(config_type)?;

    let tx = db.begin().await?;
    let record = create_in(
        &tx,
        key,
        content.to_string(),
        config_type.to_string(),
        author,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(key = %key, id = record.id, author, "config created");

    Ok(record)
}

/// Publish a new version derived from the latest version of `key`.
///
/// Fields left unset in `update` are carried over. When `update` renames the
/// key the version is written under the new dataId/groupId in the same
/// tenant and numbered after that key's max version.
pub async fn append(
    db: &DatabaseConnection,
    whitelist: &Whitelist,
    key: &ConfigKey,
    update: ConfigUpdate,
    author: &str,
) -> Result<ConfigRecord> {
    key.validate()?;
    if let Some(config_type) = update.config_type.as_deref() {
        whitelist.check_config_type(config_type)?;
    }

    let target = ConfigKey::new(
        update.data_id.unwrap_or_else(|| key.data_id.clone()),
        update.group_id.unwrap_or_else(|| key.group_id.clone()),
        key.tenant_id.clone(),
    );
    target.validate()?;

    let tx = db.begin().await?;
    acquire_key_lock(&tx, &target).await?;

    let (content, config_type) = match find_latest(&tx, key).await? {
        Some(latest) => (
            update.content.unwrap_or(latest.content),
            update.config_type.unwrap_or(latest.r#type),
        ),
        None => match (update.content, update.config_type) {
            (Some(content), Some(config_type)) => (content, config_type),
            _ => {
                return Err(ConfkeeperError::validation(format!(
                    "content and type are required for new config '{}'",
                    key
                )));
            }
        },
    };

    let version = max_version(&tx, &target).await? + 1;
    let model = insert_version(&tx, &target, content, config_type, version, author)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                tracing::warn!(key = %target, version, "version already taken");
                ConfkeeperError::conflict(format!(
                    "version {} of config '{}' was published concurrently",
                    version, target
                ))
            } else {
                e.into()
            }
        })?;
    tx.commit().await?;

    tracing::info!(key = %target, version, author, "config version appended");

    Ok(ConfigRecord::from(model))
}

pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<ConfigRecord> {
    config_info::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(ConfigRecord::from)
        .ok_or_else(|| ConfkeeperError::not_found(format!("config record {}", id)))
}

pub async fn get_latest(db: &DatabaseConnection, key: &ConfigKey) -> Result<ConfigRecord> {
    tracing::debug!(key = %key, "fetching latest config");

    find_latest(db, key)
        .await?
        .map(ConfigRecord::from)
        .ok_or_else(|| ConfkeeperError::not_found(format!("config '{}'", key)))
}

/// All surviving versions of `key`, newest first
pub async fn get_versions(db: &DatabaseConnection, key: &ConfigKey) -> Result<Vec<ConfigRecord>> {
    let versions = config_info::Entity::find()
        .filter(key_condition(key))
        .order_by_desc(config_info::Column::Version)
        .all(db)
        .await?
        .into_iter()
        .map(ConfigRecord::from)
        .collect();

    Ok(versions)
}

// Listing metadata of one key, built from its surviving records
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct KeyHead {
    pub first_id: i64,
    pub latest_id: i64,
    pub latest_version: i32,
    pub latest_type: String,
}

// (id, dataId, groupId, version, type) rows of one tenant, folded per key and
// ordered by the id of the key's earliest surviving record
pub(crate) fn fold_key_heads(rows: Vec<(i64, String, String, i32, String)>) -> Vec<KeyHead> {
    let mut heads: HashMap<(String, String), KeyHead> = HashMap::new();

    for (id, data_id, group_id, version, config_type) in rows {
        heads
            .entry((data_id, group_id))
            .and_modify(|head| {
                head.first_id = head.first_id.min(id);
                if version > head.latest_version {
                    head.latest_id = id;
                    head.latest_version = version;
                    head.latest_type = config_type.clone();
                }
            })
            .or_insert_with(|| KeyHead {
                first_id: id,
                latest_id: id,
                latest_version: version,
                latest_type: config_type,
            });
    }

    let mut heads: Vec<KeyHead> = heads.into_values().collect();
    heads.sort_by_key(|head| head.first_id);
    heads
}

/// One row per key of `tenant_id` (its latest version), paginated.
///
/// dataId and groupId filters match any record of the key; the type filter
/// matches the latest version's type. Keys are ordered by their first
/// surviving record.
pub async fn list_keys(
    db: &DatabaseConnection,
    tenant_id: &str,
    filter: &ListFilter,
    page_no: u64,
    page_size: u64,
) -> Result<Page<ConfigRecord>> {
    let offset = page_offset(page_no, page_size)?;

    let mut select = config_info::Entity::find()
        .select_only()
        .columns([
            config_info::Column::Id,
            config_info::Column::DataId,
            config_info::Column::GroupId,
            config_info::Column::Version,
            config_info::Column::Type,
        ])
        .filter(config_info::Column::TenantId.eq(tenant_id));

    if !filter.data_id.is_empty() {
        select = select.filter(config_info::Column::DataId.contains(&filter.data_id));
    }
    if !filter.group_id.is_empty() {
        select = select.filter(config_info::Column::GroupId.contains(&filter.group_id));
    }

    let tx = db.begin().await?;

    let rows = select
        .into_tuple::<(i64, String, String, i32, String)>()
        .all(&tx)
        .await?;

    let heads: Vec<KeyHead> = fold_key_heads(rows)
        .into_iter()
        .filter(|head| {
            filter.config_type.is_empty() || head.latest_type.contains(&filter.config_type)
        })
        .collect();
    let total_count = heads.len() as u64;

    let page_ids: Vec<i64> = heads
        .iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(page_size as usize)
        .map(|head| head.latest_id)
        .collect();

    if page_ids.is_empty() {
        tx.commit().await?;
        return Ok(Page::new(total_count, page_no, page_size, Vec::new()));
    }

    let mut records: HashMap<i64, config_info::Model> = config_info::Entity::find()
        .filter(config_info::Column::Id.is_in(page_ids.clone()))
        .all(&tx)
        .await?
        .into_iter()
        .map(|model| (model.id, model))
        .collect();

    tx.commit().await?;

    let page_items = page_ids
        .iter()
        .filter_map(|id| records.remove(id))
        .map(ConfigRecord::from)
        .collect();

    Ok(Page::new(total_count, page_no, page_size, page_items))
}

/// Remove every version of `key`
pub async fn delete_key(db: &DatabaseConnection, key: &ConfigKey) -> Result<u64> {
    let tx = db.begin().await?;
    acquire_key_lock(&tx, key).await?;

    let removed = config_info::Entity::delete_many()
        .filter(key_condition(key))
        .exec(&tx)
        .await?
        .rows_affected;

    if removed == 0 {
        return Err(ConfkeeperError::not_found(format!("config '{}'", key)));
    }

    tx.commit().await?;

    tracing::info!(key = %key, removed, "config deleted");

    Ok(removed)
}

/// Delete every key that owns one of `ids`, all or nothing.
///
/// Fails with `NotFound` on the first unknown id before anything is removed.
pub async fn delete_by_ids(db: &DatabaseConnection, ids: &[i64]) -> Result<u64> {
    let tx = db.begin().await?;

    let mut keys = BTreeSet::new();
    for id in ids {
        let model = config_info::Entity::find_by_id(*id)
            .one(&tx)
            .await?
            .ok_or_else(|| ConfkeeperError::not_found(format!("config record {}", id)))?;
        keys.insert(ConfigKey::new(model.data_id, model.group_id, model.tenant_id));
    }

    let mut removed = 0;
    for key in &keys {
        acquire_key_lock(&tx, key).await?;
        removed += config_info::Entity::delete_many()
            .filter(key_condition(key))
            .exec(&tx)
            .await?
            .rows_affected;
    }

    tx.commit().await?;

    tracing::info!(keys = keys.len(), removed, "configs deleted by id");

    Ok(removed)
}

/// Copy record `source_id` into a brand new key; never overwrites
pub async fn clone(
    db: &DatabaseConnection,
    whitelist: &Whitelist,
    source_id: i64,
    target: &ConfigKey,
    author: &str,
) -> Result<ConfigRecord> {
    target.validate()?;

    let tx = db.begin().await?;

    let source = config_info::Entity::find_by_id(source_id)
        .one(&tx)
        .await?
        .ok_or_else(|| ConfkeeperError::not_found(format!("config record {}", source_id)))?;
    whitelist.check_config_type(&source.r#type)?;

    let record = create_in(&tx, target, source.content, source.r#type, author).await?;
    tx.commit().await?;

    tracing::info!(source_id, key = %target, author, "config cloned");

    Ok(record)
}

/// Clone several records into `tenant_id` in one transaction.
///
/// Any missing source or existing target rolls the whole batch back.
pub async fn clone_batch(
    db: &DatabaseConnection,
    whitelist: &Whitelist,
    tenant_id: &str,
    items: &[CloneItem],
    author: &str,
) -> Result<Vec<ConfigRecord>> {
    let targets: Vec<ConfigKey> = items
        .iter()
        .map(|item| ConfigKey::new(&item.data_id, &item.group_id, tenant_id))
        .collect();
    for target in &targets {
        target.validate()?;
    }

    let tx = db.begin().await?;

    // Lock in key order so concurrent batches cannot deadlock
    let ordered: BTreeSet<&ConfigKey> = targets.iter().collect();
    for target in ordered {
        acquire_key_lock(&tx, target).await?;
    }

    let mut records = Vec::with_capacity(items.len());
    for (item, target) in items.iter().zip(&targets) {
        let source = config_info::Entity::find_by_id(item.source_id)
            .one(&tx)
            .await?
            .ok_or_else(|| {
                ConfkeeperError::not_found(format!("config record {}", item.source_id))
            })?;
        whitelist.check_config_type(&source.r#type)?;

        records.push(create_in(&tx, target, source.content, source.r#type, author).await?);
    }

    tx.commit().await?;

    tracing::info!(tenant_id, count = records.len(), author, "configs cloned");

    Ok(records)
}

/// Config types clients may publish
pub fn config_types(whitelist: &Whitelist) -> &[String] {
    &whitelist.config_types
}
