use super::{StatusUpdateRequest, present};
use crate::error::{ApiError, ApiResultExt};
use crate::extract::{ApiJson, clearable, loose_string};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tracker_core::{
    ItemId, ItemStage, ItemType, NewPrerequisite, NewReleaseItem, PrerequisiteCategory, ReleaseId,
    ReleaseItem, ReleaseItemPatch,
};
use tracker_engine::RollupEngine;
use tracker_store::ReleaseStore;

#[derive(Clone)]
pub struct ItemsController {
    store: Arc<dyn ReleaseStore>,
    engine: RollupEngine,
}

impl ItemsController {
    pub fn new(engine: RollupEngine) -> Self {
        Self { store: engine.store().clone(), engine }
    }
}

#[derive(Debug, Deserialize)]
pub struct PrerequisiteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub category: Option<String>,
}

impl PrerequisiteRequest {
    pub(crate) fn validate(self) -> Result<NewPrerequisite, ApiError> {
        let (Some(title), Some(category)) = (present(self.title), present(self.category)) else {
            return Err(ApiError::bad_request("Title and category are required"));
        };
        let category = PrerequisiteCategory::parse(&category).or_api("Invalid category")?;
        Ok(NewPrerequisite { title, category })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "loose_string")]
    pub item_type: Option<String>,
    #[serde(default, alias = "jira_link")]
    pub jira_link: Option<String>,
    #[serde(default, alias = "doc_link")]
    pub doc_link: Option<String>,
    #[serde(default)]
    pub prerequisites: Vec<PrerequisiteRequest>,
}

/// Field update of an item. A `status` key, if sent, is ignored; `null` clears
/// the description and links.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub description: Option<Option<String>>,
    #[serde(default, rename = "type", deserialize_with = "loose_string")]
    pub item_type: Option<String>,
    #[serde(default, alias = "jira_link", deserialize_with = "clearable")]
    pub jira_link: Option<Option<String>>,
    #[serde(default, alias = "doc_link", deserialize_with = "clearable")]
    pub doc_link: Option<Option<String>>,
}

impl UpdateItemRequest {
    fn into_patch(self) -> Result<ReleaseItemPatch, ApiError> {
        let item_type = match present(self.item_type) {
            Some(raw) => Some(ItemType::parse(&raw).or_api("Invalid type")?),
            None => None,
        };
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ApiError::bad_request("Title cannot be empty"));
        }
        Ok(ReleaseItemPatch {
            title: self.title,
            description: self.description,
            item_type,
            jira_link: self.jira_link,
            doc_link: self.doc_link,
        })
    }
}

pub async fn create_item(
    State(controller): State<ItemsController>,
    Path(release_id): Path<String>,
    ApiJson(req): ApiJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<ReleaseItem>), ApiError> {
    let (Some(title), Some(raw_type)) = (present(req.title), present(req.item_type)) else {
        return Err(ApiError::bad_request("Title and type are required"));
    };
    let item_type = ItemType::parse(&raw_type).or_api("Invalid type")?;
    let prerequisites = req
        .prerequisites
        .into_iter()
        .map(PrerequisiteRequest::validate)
        .collect::<Result<Vec<_>, _>>()?;
    let release_id = ReleaseId::parse(&release_id).or_api("Failed to create release item")?;

    let item = controller
        .store
        .create_item(
            release_id,
            NewReleaseItem {
                title,
                description: present(req.description),
                item_type,
                jira_link: present(req.jira_link),
                doc_link: present(req.doc_link),
                prerequisites,
            },
        )
        .await
        .or_api("Failed to create release item")?;

    tracing::info!(item_id = %item.id, %release_id, "release item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_items(
    State(controller): State<ItemsController>,
    Path(release_id): Path<String>,
) -> Result<Json<Vec<ReleaseItem>>, ApiError> {
    let release_id = ReleaseId::parse(&release_id).or_api("Failed to fetch release items")?;
    let items = controller.store.list_items(release_id).await.or_api("Failed to fetch release items")?;
    Ok(Json(items))
}

pub async fn get_item(
    State(controller): State<ItemsController>,
    Path(item_id): Path<String>,
) -> Result<Json<ReleaseItem>, ApiError> {
    let item_id = ItemId::parse(&item_id).or_api("Failed to fetch release item")?;
    let item = controller
        .store
        .get_item(item_id)
        .await
        .or_api("Failed to fetch release item")?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    let prerequisites =
        controller.store.list_prerequisites(item_id).await.or_api("Failed to fetch release item")?;

    Ok(Json(item.with_prerequisites(prerequisites)))
}

pub async fn update_item(
    State(controller): State<ItemsController>,
    Path(item_id): Path<String>,
    ApiJson(req): ApiJson<UpdateItemRequest>,
) -> Result<Json<ReleaseItem>, ApiError> {
    let patch = req.into_patch()?;
    let item_id = ItemId::parse(&item_id).or_api("Failed to update release item")?;

    let item = controller
        .store
        .update_item(item_id, patch)
        .await
        .or_api("Failed to update release item")?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    Ok(Json(item))
}

pub async fn update_item_status(
    State(controller): State<ItemsController>,
    Path(item_id): Path<String>,
    ApiJson(req): ApiJson<StatusUpdateRequest>,
) -> Result<Json<ReleaseItem>, ApiError> {
    let stage = ItemStage::parse(req.status.as_deref().unwrap_or_default())
        .or_api("Failed to update item status")?;
    let item_id = ItemId::parse(&item_id).or_api("Failed to update item status")?;

    let item = controller
        .engine
        .transition_item(item_id, stage)
        .await
        .or_api("Failed to update item status")?;
    Ok(Json(item))
}
