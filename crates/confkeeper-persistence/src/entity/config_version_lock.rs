//! Per-key version lock entity
//!
//! One marker row per configuration key. Writers lock the row with
//! `SELECT ... FOR UPDATE` before reading the key's max version. On SQLite,
//! which drops that clause, the insert-or-ignore of the marker row takes the
//! database write lock and that lock serializes writers instead.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "config_version_lock")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub data_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub tenant_id: String,
    pub gmt_create: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
