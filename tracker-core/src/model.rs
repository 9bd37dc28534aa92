use crate::{
    ItemId, ItemStage, ItemType, PrerequisiteCategory, PrerequisiteId, PrerequisiteStage,
    ProductId, ReleaseId, ReleaseStage,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: ReleaseId,
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub target_date: NaiveDate,
    #[serde(rename = "status")]
    pub stage: ReleaseStage,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseItem {
    pub id: ItemId,
    pub release_id: ReleaseId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(rename = "status")]
    pub stage: ItemStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_link: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Only populated on responses that embed the item's checklist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<Prerequisite>>,
}

impl ReleaseItem {
    pub fn with_prerequisites(mut self, prerequisites: Vec<Prerequisite>) -> Self {
        self.prerequisites = Some(prerequisites);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prerequisite {
    pub id: PrerequisiteId,
    pub release_item_id: ItemId,
    pub title: String,
    pub category: PrerequisiteCategory,
    #[serde(rename = "status")]
    pub stage: PrerequisiteStage,
    pub created_at: DateTime<Utc>,
}

/// A release together with all of its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDetail {
    #[serde(flatten)]
    pub release: Release,
    pub items: Vec<ReleaseItem>,
}
