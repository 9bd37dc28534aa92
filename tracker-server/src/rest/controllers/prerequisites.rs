use super::StatusUpdateRequest;
use super::items::PrerequisiteRequest;
use crate::error::{ApiError, ApiResultExt};
use crate::extract::ApiJson;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracker_core::{ItemId, Prerequisite, PrerequisiteId, PrerequisiteStage};
use tracker_engine::RollupEngine;
use tracker_store::ReleaseStore;

#[derive(Clone)]
pub struct PrerequisitesController {
    store: Arc<dyn ReleaseStore>,
    engine: RollupEngine,
}

impl PrerequisitesController {
    pub fn new(engine: RollupEngine) -> Self {
        Self { store: engine.store().clone(), engine }
    }
}

pub async fn create_prerequisite(
    State(controller): State<PrerequisitesController>,
    Path(item_id): Path<String>,
    ApiJson(req): ApiJson<PrerequisiteRequest>,
) -> Result<(StatusCode, Json<Prerequisite>), ApiError> {
    let prerequisite = req.validate()?;
    let item_id = ItemId::parse(&item_id).or_api("Failed to add prerequisite")?;

    let prerequisite = controller
        .store
        .create_prerequisite(item_id, prerequisite)
        .await
        .or_api("Failed to add prerequisite")?;

    tracing::info!(prerequisite_id = %prerequisite.id, %item_id, "prerequisite added");
    Ok((StatusCode::CREATED, Json(prerequisite)))
}

pub async fn update_prerequisite_status(
    State(controller): State<PrerequisitesController>,
    Path(prerequisite_id): Path<String>,
    ApiJson(req): ApiJson<StatusUpdateRequest>,
) -> Result<Json<Prerequisite>, ApiError> {
    let stage = PrerequisiteStage::parse(req.status.as_deref().unwrap_or_default())
        .or_api("Failed to update prerequisite status")?;
    let prerequisite_id =
        PrerequisiteId::parse(&prerequisite_id).or_api("Failed to update prerequisite status")?;

    let prerequisite = controller
        .engine
        .transition_prerequisite(prerequisite_id, stage)
        .await
        .or_api("Failed to update prerequisite status")?;
    Ok(Json(prerequisite))
}
