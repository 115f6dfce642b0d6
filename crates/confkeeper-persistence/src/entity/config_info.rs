//! Configuration version entity
//!
//! Every publish inserts one row; rows are never updated. The
//! (data_id, group_id, tenant_id, version) tuple is unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "config_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub data_id: String,
    pub group_id: String,
    pub tenant_id: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// Content type, one of the configured whitelist
    pub r#type: String,
    /// Append ordinal within the key, starting at 1
    pub version: i32,
    pub author: String,
    pub gmt_create: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
