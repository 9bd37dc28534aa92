//! Validated inputs for creating and patching entities.

use crate::{ItemType, PrerequisiteCategory, ReleaseItem};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewRelease {
    pub name: String,
    pub description: Option<String>,
    pub target_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewReleaseItem {
    pub title: String,
    pub description: Option<String>,
    pub item_type: ItemType,
    pub jira_link: Option<String>,
    pub doc_link: Option<String>,
    /// Created in the same atomic unit as the item, all `PENDING`.
    pub prerequisites: Vec<NewPrerequisite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrerequisite {
    pub title: String,
    pub category: PrerequisiteCategory,
}

/// Field-level update of a release item. `None` leaves a field untouched;
/// `Some(None)` clears an optional field.
///
/// The stage is deliberately absent: it only changes through the rollup engine.
#[derive(Debug, Clone, Default)]
pub struct ReleaseItemPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub item_type: Option<ItemType>,
    pub jira_link: Option<Option<String>>,
    pub doc_link: Option<Option<String>>,
}

impl ReleaseItemPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.item_type.is_none()
            && self.jira_link.is_none()
            && self.doc_link.is_none()
    }

    pub fn apply(&self, item: &mut ReleaseItem) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(item_type) = self.item_type {
            item.item_type = item_type;
        }
        if let Some(jira_link) = &self.jira_link {
            item.jira_link = jira_link.clone();
        }
        if let Some(doc_link) = &self.doc_link {
            item.doc_link = doc_link.clone();
        }
    }
}
