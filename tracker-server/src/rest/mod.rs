pub mod controllers;

pub use controllers::{
    ItemsController, PrerequisitesController, ProductsController, ReleasesController,
};

use crate::ServerConfig;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build CORS layer based on security configuration
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.security.allowed_origins.is_empty() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> =
            config.security.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

/// Create the tracker application
pub fn create_app(config: ServerConfig) -> Router {
    let engine = config.engine();
    let products_controller = ProductsController::new(config.store.clone());
    let releases_controller = ReleasesController::new(engine.clone());
    let items_controller = ItemsController::new(engine.clone());
    let prerequisites_controller = PrerequisitesController::new(engine);

    let app = Router::new()
        .route("/health", get(health_check))
        .route(
            "/products",
            get(controllers::products::list_products).post(controllers::products::create_product),
        )
        .with_state(products_controller)
        .route(
            "/products/{product_id}/releases",
            get(controllers::releases::list_releases).post(controllers::releases::create_release),
        )
        .route("/releases/{release_id}", get(controllers::releases::get_release))
        .route(
            "/releases/{release_id}/status",
            patch(controllers::releases::update_release_status),
        )
        .with_state(releases_controller)
        .route(
            "/releases/{release_id}/items",
            get(controllers::items::list_items).post(controllers::items::create_item),
        )
        .route(
            "/items/{item_id}",
            get(controllers::items::get_item).patch(controllers::items::update_item),
        )
        .route("/items/{item_id}/status", patch(controllers::items::update_item_status))
        .with_state(items_controller)
        .route(
            "/items/{item_id}/prerequisites",
            post(controllers::prerequisites::create_prerequisite),
        )
        .route(
            "/prerequisites/{prerequisite_id}/status",
            patch(controllers::prerequisites::update_prerequisite_status),
        )
        .with_state(prerequisites_controller);

    let cors_layer = build_cors_layer(&config);

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.security.request_timeout,
            ))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(cors_layer)
            // Security headers
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            )),
    )
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
