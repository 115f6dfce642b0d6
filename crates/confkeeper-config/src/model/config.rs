// Configuration data models used by the versioned store

use serde::{Deserialize, Serialize};

// Fields to change when appending a version; `None` carries the latest value forward
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub data_id: Option<String>,
    pub group_id: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub config_type: Option<String>,
}

impl ConfigUpdate {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, config_type: impl Into<String>) -> Self {
        self.config_type = Some(config_type.into());
        self
    }

    pub fn rename(mut self, data_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        self.data_id = Some(data_id.into());
        self.group_id = Some(group_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data_id.is_none()
            && self.group_id.is_none()
            && self.content.is_none()
            && self.config_type.is_none()
    }
}

// Substring filters for key listing; empty strings match everything
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListFilter {
    pub data_id: String,
    pub group_id: String,
    #[serde(rename = "type")]
    pub config_type: String,
}

impl ListFilter {
    pub fn data_id(mut self, data_id: impl Into<String>) -> Self {
        self.data_id = data_id.into();
        self
    }

    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    pub fn config_type(mut self, config_type: impl Into<String>) -> Self {
        self.config_type = config_type.into();
        self
    }
}

// One entry of a batch clone: copy record `source_id` to a new key in the target tenant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneItem {
    pub source_id: i64,
    pub data_id: String,
    pub group_id: String,
}

impl CloneItem {
    pub fn new(source_id: i64, data_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            source_id,
            data_id: data_id.into(),
            group_id: group_id.into(),
        }
    }
}

// Outcome of one compaction pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactionReport {
    pub keys_compacted: u64,
    pub records_removed: u64,
}
