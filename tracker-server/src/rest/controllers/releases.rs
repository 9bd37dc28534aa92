use super::{StatusUpdateRequest, present};
use crate::error::{ApiError, ApiResultExt};
use crate::extract::ApiJson;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use tracker_core::{
    NewRelease, ProductId, Release, ReleaseDetail, ReleaseId, ReleaseListing, ReleaseStage,
};
use tracker_engine::RollupEngine;
use tracker_store::ReleaseStore;

#[derive(Clone)]
pub struct ReleasesController {
    store: Arc<dyn ReleaseStore>,
    engine: RollupEngine,
}

impl ReleasesController {
    pub fn new(engine: RollupEngine) -> Self {
        Self { store: engine.store().clone(), engine }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReleaseRequest {
    #[serde(default, alias = "target_date")]
    pub target_date: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Accepts a calendar date, or a full timestamp of which only the date is kept.
fn parse_target_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|ts| ts.date_naive()))
        .map_err(|_| ApiError::bad_request("Invalid target date"))
}

pub async fn create_release(
    State(controller): State<ReleasesController>,
    Path(product_id): Path<String>,
    ApiJson(req): ApiJson<CreateReleaseRequest>,
) -> Result<(StatusCode, Json<Release>), ApiError> {
    let (Some(raw_date), Some(name)) = (present(req.target_date), present(req.name)) else {
        return Err(ApiError::bad_request("Target date and name are required"));
    };
    let target_date = parse_target_date(&raw_date)?;
    let product_id = ProductId::parse(&product_id).or_api("Failed to create release")?;

    let release = controller
        .store
        .create_release(
            product_id,
            NewRelease { name, description: present(req.description), target_date },
        )
        .await
        .or_api("Failed to create release")?;

    tracing::info!(release_id = %release.id, %product_id, "release created");
    Ok((StatusCode::CREATED, Json(release)))
}

pub async fn list_releases(
    State(controller): State<ReleasesController>,
    Path(product_id): Path<String>,
) -> Result<Json<ReleaseListing>, ApiError> {
    let product_id = ProductId::parse(&product_id).or_api("Failed to fetch releases")?;
    let releases = controller.store.list_releases(product_id).await.or_api("Failed to fetch releases")?;
    Ok(Json(ReleaseListing::from_releases(releases)))
}

pub async fn get_release(
    State(controller): State<ReleasesController>,
    Path(release_id): Path<String>,
) -> Result<Json<ReleaseDetail>, ApiError> {
    let release_id = ReleaseId::parse(&release_id).or_api("Failed to fetch release data")?;
    let release = controller
        .store
        .get_release(release_id)
        .await
        .or_api("Failed to fetch release data")?
        .ok_or_else(|| ApiError::not_found("Release not found"))?;
    let items = controller.store.list_items(release_id).await.or_api("Failed to fetch release data")?;

    Ok(Json(ReleaseDetail { release, items }))
}

pub async fn update_release_status(
    State(controller): State<ReleasesController>,
    Path(release_id): Path<String>,
    ApiJson(req): ApiJson<StatusUpdateRequest>,
) -> Result<Json<Release>, ApiError> {
    let stage = ReleaseStage::parse(req.status.as_deref().unwrap_or_default())
        .or_api("Failed to update release status")?;
    let release_id = ReleaseId::parse(&release_id).or_api("Failed to update release status")?;

    let release = controller
        .engine
        .transition_release(release_id, stage)
        .await
        .or_api("Failed to update release status")?;
    Ok(Json(release))
}
