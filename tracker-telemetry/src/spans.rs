//! Span helpers for the tracker's cross-entity operations.

use tracing::Span;

/// Span around a stage transition of one entity.
///
/// # Example
/// ```
/// use tracker_telemetry::transition_span;
/// let span = transition_span("release_item", "3f2b…", "RELEASED");
/// let _enter = span.enter();
/// ```
pub fn transition_span(entity: &str, id: &str, target: &str) -> Span {
    tracing::info_span!(
        "stage.transition",
        entity = entity,
        entity.id = id,
        stage.target = target,
        otel.kind = "internal"
    )
}

/// Span around the delivery of a release-completed notification.
pub fn notification_span(release_id: &str) -> Span {
    tracing::info_span!("release.notify", release.id = release_id, otel.kind = "client")
}

pub fn store_span(operation: &str) -> Span {
    tracing::debug_span!("store", store.operation = operation)
}
