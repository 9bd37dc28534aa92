use crate::ServeArgs;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracker_engine::DispatchMode;
use tracker_server::{ServerConfig, create_app};
use tracker_store::{DatabaseReleaseStore, InMemoryReleaseStore, ReleaseStore};

const SERVICE_NAME: &str = "release-tracker";

/// Installs the log subscriber. Returns `true` when spans are exported over OTLP.
///
/// An endpoint that cannot be set up still leaves console logging in place.
fn init_logging(otlp_endpoint: Option<&str>) -> bool {
    if let Some(endpoint) = otlp_endpoint {
        match tracker_telemetry::init_with_otlp(SERVICE_NAME, endpoint) {
            Ok(()) => return true,
            Err(e) => {
                eprintln!("Failed to initialize OTLP export to {}, logging to console: {}", endpoint, e)
            }
        }
    }
    if let Err(e) = tracker_telemetry::init_telemetry(SERVICE_NAME) {
        eprintln!("Failed to initialize telemetry: {}", e);
    }
    false
}

async fn open_store(database_url: Option<&str>) -> Result<Arc<dyn ReleaseStore>> {
    match database_url {
        Some(url) => {
            let store = DatabaseReleaseStore::new(url)
                .await
                .with_context(|| format!("failed to open database {url}"))?;
            store.migrate().await.context("failed to migrate database")?;
            tracing::info!("using database store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data will be lost on restart");
            Ok(Arc::new(InMemoryReleaseStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
    tracing::info!("shutting down");
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let otlp = init_logging(args.otlp_endpoint.as_deref());

    let store = open_store(args.database_url.as_deref()).await?;
    let notifier = tracker_notify::notifier_from_webhook(args.slack_webhook_url.clone())
        .context("failed to configure release notifications")?;
    let dispatch =
        if args.inline_notifications { DispatchMode::Inline } else { DispatchMode::Background };

    if args.allowed_origins.is_empty() {
        tracing::warn!("no allowed origins configured, CORS accepts any origin");
    }

    let config = ServerConfig::new(store)
        .with_notifier(notifier)
        .with_dispatch(dispatch)
        .with_allowed_origins(args.allowed_origins.clone());
    let app = create_app(config);

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "release tracker listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    if otlp {
        tracker_telemetry::shutdown_telemetry();
    }
    Ok(())
}

pub async fn run_migrate(database_url: &str) -> Result<()> {
    init_logging(None);

    let store = DatabaseReleaseStore::new(database_url)
        .await
        .with_context(|| format!("failed to open database {database_url}"))?;
    store.migrate().await.context("failed to migrate database")?;

    tracing::info!("migration complete");
    Ok(())
}
