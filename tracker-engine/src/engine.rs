use std::sync::Arc;
use tracing::Instrument;
use tracker_core::{
    ItemId, ItemStage, Prerequisite, PrerequisiteId, PrerequisiteStage, ProductId, Release,
    ReleaseId, ReleaseItem, ReleaseStage, Result, TrackerError,
};
use tracker_notify::{ReleaseNotifier, ReleaseSummary};
use tracker_store::ReleaseStore;
use tracker_telemetry::{notification_span, transition_span};

/// How the release-completed notification is delivered relative to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Spawned onto the runtime; the caller never waits for the webhook.
    #[default]
    Background,
    /// Awaited before the transition returns. Failures are still swallowed.
    Inline,
}

#[derive(Clone)]
pub struct RollupEngine {
    store: Arc<dyn ReleaseStore>,
    notifier: Arc<dyn ReleaseNotifier>,
    dispatch: DispatchMode,
}

impl RollupEngine {
    pub fn new(store: Arc<dyn ReleaseStore>, notifier: Arc<dyn ReleaseNotifier>) -> Self {
        Self { store, notifier, dispatch: DispatchMode::default() }
    }

    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn store(&self) -> &Arc<dyn ReleaseStore> {
        &self.store
    }

    pub fn dispatch(&self) -> DispatchMode {
        self.dispatch
    }

    /// Direct write with no cross-entity effects.
    pub async fn transition_prerequisite(
        &self,
        id: PrerequisiteId,
        stage: PrerequisiteStage,
    ) -> Result<Prerequisite> {
        let span = transition_span("prerequisite", &id.to_string(), stage.as_str());
        async {
            self.store.set_prerequisite_stage(id, stage).await?.ok_or_else(PrerequisiteId::not_found)
        }
        .instrument(span)
        .await
    }

    /// Moves an item to `stage`.
    ///
    /// `RELEASED` is refused while any prerequisite of the item is not `DONE`.
    /// After a successful write to `RELEASED` the owning release is
    /// re-evaluated before this returns.
    pub async fn transition_item(&self, id: ItemId, stage: ItemStage) -> Result<ReleaseItem> {
        let span = transition_span("release_item", &id.to_string(), stage.as_str());
        async {
            let item = self.store.get_item(id).await?.ok_or_else(ItemId::not_found)?;

            if stage.is_released() {
                let pending = self.store.count_pending_prerequisites(id).await?;
                if pending > 0 {
                    tracing::info!(pending, "release refused, prerequisites outstanding");
                    return Err(TrackerError::PrerequisitesPending);
                }
            }

            let updated =
                self.store.set_item_stage(id, stage).await?.ok_or_else(ItemId::not_found)?;

            if stage.is_released() {
                self.evaluate_release(item.release_id).await?;
            }
            Ok(updated)
        }
        .instrument(span)
        .await
    }

    /// Direct write of a release stage.
    ///
    /// Unlike the cascade this does not check the release's items.
    pub async fn transition_release(&self, id: ReleaseId, stage: ReleaseStage) -> Result<Release> {
        let span = transition_span("release", &id.to_string(), stage.as_str());
        async {
            self.store.get_release(id).await?.ok_or_else(ReleaseId::not_found)?;

            if stage.is_released() {
                let unreleased = self.store.count_unreleased_items(id).await?;
                if unreleased > 0 {
                    // TODO: decide whether the direct path should enforce the all-items-released rule
                    tracing::warn!(
                        unreleased,
                        "release marked RELEASED directly while items are still unreleased"
                    );
                }
            }

            self.store.set_release_stage(id, stage).await?.ok_or_else(ReleaseId::not_found)
        }
        .instrument(span)
        .await
    }

    /// Completes the release if none of its items is left unreleased.
    ///
    /// Returns `true` when this call moved the release to `RELEASED`; only then
    /// is the notification dispatched. Calling it again is a no-op.
    pub async fn evaluate_release(&self, release_id: ReleaseId) -> Result<bool> {
        let unreleased = self.store.count_unreleased_items(release_id).await?;
        if unreleased > 0 {
            tracing::debug!(release.id = %release_id, unreleased, "release still has open items");
            return Ok(false);
        }

        if !self.store.complete_release(release_id).await? {
            tracing::debug!(release.id = %release_id, "release already released");
            return Ok(false);
        }

        tracing::info!(release.id = %release_id, "all items released, release completed");
        self.dispatch_notification(release_id).await;
        Ok(true)
    }

    async fn dispatch_notification(&self, release_id: ReleaseId) {
        let store = self.store.clone();
        let notifier = self.notifier.clone();
        let task = async move {
            if let Err(e) = deliver(store.as_ref(), notifier.as_ref(), release_id).await {
                tracing::error!(error = %e, "failed to send release notification");
            }
        }
        .instrument(notification_span(&release_id.to_string()));

        match self.dispatch {
            DispatchMode::Inline => task.await,
            DispatchMode::Background => {
                tokio::spawn(task);
            }
        }
    }
}

async fn deliver(
    store: &dyn ReleaseStore,
    notifier: &dyn ReleaseNotifier,
    release_id: ReleaseId,
) -> Result<()> {
    let release = store.get_release(release_id).await?.ok_or_else(ReleaseId::not_found)?;
    let product =
        store.get_product(release.product_id).await?.ok_or_else(ProductId::not_found)?;
    let items = store.list_items(release_id).await?;

    notifier.notify(&ReleaseSummary { product, release, items }).await
}
