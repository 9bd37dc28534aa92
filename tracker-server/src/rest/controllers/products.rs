use super::present;
use crate::error::{ApiError, ApiResultExt};
use crate::extract::ApiJson;
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracker_core::{NewProduct, Product};
use tracker_store::ReleaseStore;

#[derive(Clone)]
pub struct ProductsController {
    store: Arc<dyn ReleaseStore>,
}

impl ProductsController {
    pub fn new(store: Arc<dyn ReleaseStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn create_product(
    State(controller): State<ProductsController>,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let name = present(req.name).ok_or_else(|| ApiError::bad_request("Name is required"))?;

    let product = controller
        .store
        .create_product(NewProduct { name })
        .await
        .or_api("Failed to create product")?;

    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(controller): State<ProductsController>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = controller.store.list_products().await.or_api("Failed to fetch products")?;
    Ok(Json(products))
}
