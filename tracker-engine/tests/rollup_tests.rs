use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracker_core::{
    ItemId, ItemStage, ItemType, NewPrerequisite, NewProduct, NewRelease, NewReleaseItem,
    PrerequisiteCategory, PrerequisiteId, PrerequisiteStage, Release, ReleaseId, ReleaseItem,
    ReleaseStage, Result, TrackerError,
};
use tracker_engine::{DispatchMode, RollupEngine};
use tracker_notify::{ReleaseNotifier, ReleaseSummary};
use tracker_store::{InMemoryReleaseStore, ReleaseStore};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<ReleaseSummary>>,
}

impl RecordingNotifier {
    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ReleaseNotifier for RecordingNotifier {
    async fn notify(&self, summary: &ReleaseSummary) -> Result<()> {
        self.sent.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl ReleaseNotifier for FailingNotifier {
    async fn notify(&self, _summary: &ReleaseSummary) -> Result<()> {
        Err(TrackerError::Notification("webhook unreachable".into()))
    }
}

struct ChannelNotifier(mpsc::UnboundedSender<ReleaseId>);

#[async_trait]
impl ReleaseNotifier for ChannelNotifier {
    async fn notify(&self, summary: &ReleaseSummary) -> Result<()> {
        let _ = self.0.send(summary.release.id);
        Ok(())
    }
}

struct Fixture {
    store: Arc<InMemoryReleaseStore>,
    notifier: Arc<RecordingNotifier>,
    engine: RollupEngine,
    release: Release,
}

impl Fixture {
    async fn new() -> Self {
        let store = Arc::new(InMemoryReleaseStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = RollupEngine::new(store.clone(), notifier.clone())
            .with_dispatch(DispatchMode::Inline);

        let product = store.create_product(NewProduct { name: "P".into() }).await.unwrap();
        let release = store
            .create_release(
                product.id,
                NewRelease {
                    name: "Winter".into(),
                    description: None,
                    target_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                },
            )
            .await
            .unwrap();

        Self { store, notifier, engine, release }
    }

    async fn item(&self, title: &str, prerequisites: &[PrerequisiteCategory]) -> ReleaseItem {
        self.store
            .create_item(
                self.release.id,
                NewReleaseItem {
                    title: title.into(),
                    description: None,
                    item_type: ItemType::Feature,
                    jira_link: None,
                    doc_link: None,
                    prerequisites: prerequisites
                        .iter()
                        .map(|c| NewPrerequisite { title: format!("{c}"), category: *c })
                        .collect(),
                },
            )
            .await
            .unwrap()
    }

    async fn release_stage(&self) -> ReleaseStage {
        self.store.get_release(self.release.id).await.unwrap().unwrap().stage
    }
}

fn prerequisite_ids(item: &ReleaseItem) -> Vec<PrerequisiteId> {
    item.prerequisites.as_ref().unwrap().iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn test_pending_prerequisite_blocks_release() {
    let fx = Fixture::new().await;
    let item = fx.item("Feature A", &[PrerequisiteCategory::EnvVar]).await;
    fx.engine.transition_item(item.id, ItemStage::PreProd).await.unwrap();

    let err = fx.engine.transition_item(item.id, ItemStage::Released).await.unwrap_err();
    assert!(matches!(err, TrackerError::PrerequisitesPending));
    assert_eq!(err.to_string(), "Cannot release item with pending prerequisites");

    let stored = fx.store.get_item(item.id).await.unwrap().unwrap();
    assert_eq!(stored.stage, ItemStage::PreProd);
    assert_eq!(fx.release_stage().await, ReleaseStage::Planned);
    assert_eq!(fx.notifier.count(), 0);
}

#[tokio::test]
async fn test_one_pending_among_done_still_blocks() {
    let fx = Fixture::new().await;
    let item = fx
        .item("Feature A", &[PrerequisiteCategory::Migration, PrerequisiteCategory::Infra])
        .await;
    let ids = prerequisite_ids(&item);
    fx.engine.transition_prerequisite(ids[0], PrerequisiteStage::Done).await.unwrap();

    let err = fx.engine.transition_item(item.id, ItemStage::Released).await.unwrap_err();
    assert!(matches!(err, TrackerError::PrerequisitesPending));
}

#[tokio::test]
async fn test_done_prerequisites_allow_release_and_cascade() {
    let fx = Fixture::new().await;
    let item = fx.item("Feature A", &[PrerequisiteCategory::EnvVar]).await;

    let prerequisite = fx
        .engine
        .transition_prerequisite(prerequisite_ids(&item)[0], PrerequisiteStage::Done)
        .await
        .unwrap();
    assert_eq!(prerequisite.stage, PrerequisiteStage::Done);

    let released = fx.engine.transition_item(item.id, ItemStage::Released).await.unwrap();
    assert_eq!(released.stage, ItemStage::Released);
    assert_eq!(fx.release_stage().await, ReleaseStage::Released);

    let sent = fx.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].release.id, fx.release.id);
    assert_eq!(sent[0].product.name, "P");
    assert_eq!(sent[0].items.len(), 1);
}

#[tokio::test]
async fn test_item_without_prerequisites_can_skip_stages() {
    let fx = Fixture::new().await;
    let item = fx.item("Hotfix", &[]).await;

    let released = fx.engine.transition_item(item.id, ItemStage::Released).await.unwrap();
    assert_eq!(released.stage, ItemStage::Released);
}

#[tokio::test]
async fn test_cascade_waits_for_last_item() {
    let fx = Fixture::new().await;
    let items = [fx.item("one", &[]).await, fx.item("two", &[]).await, fx.item("three", &[]).await];

    for item in &items[..2] {
        fx.engine.transition_item(item.id, ItemStage::Released).await.unwrap();
        assert_eq!(fx.release_stage().await, ReleaseStage::Planned);
    }
    assert_eq!(fx.notifier.count(), 0);

    fx.engine.transition_item(items[2].id, ItemStage::Released).await.unwrap();
    assert_eq!(fx.release_stage().await, ReleaseStage::Released);
    assert_eq!(fx.notifier.count(), 1);
}

#[tokio::test]
async fn test_non_released_transitions_do_not_cascade() {
    let fx = Fixture::new().await;
    let item = fx.item("one", &[]).await;

    fx.engine.transition_item(item.id, ItemStage::PreProd).await.unwrap();
    fx.engine.transition_item(item.id, ItemStage::Dev).await.unwrap();
    assert_eq!(fx.release_stage().await, ReleaseStage::Planned);
}

#[tokio::test]
async fn test_repeated_release_notifies_once() {
    let fx = Fixture::new().await;
    let item = fx.item("one", &[]).await;

    fx.engine.transition_item(item.id, ItemStage::Released).await.unwrap();
    let again = fx.engine.transition_item(item.id, ItemStage::Released).await.unwrap();

    assert_eq!(again.stage, ItemStage::Released);
    assert_eq!(fx.release_stage().await, ReleaseStage::Released);
    assert_eq!(fx.notifier.count(), 1);
    assert!(!fx.engine.evaluate_release(fx.release.id).await.unwrap());
}

#[tokio::test]
async fn test_notification_failure_keeps_release_released() {
    let fx = Fixture::new().await;
    let engine = RollupEngine::new(fx.store.clone(), Arc::new(FailingNotifier))
        .with_dispatch(DispatchMode::Inline);
    let item = fx.item("one", &[]).await;

    let released = engine.transition_item(item.id, ItemStage::Released).await.unwrap();
    assert_eq!(released.stage, ItemStage::Released);
    assert_eq!(fx.release_stage().await, ReleaseStage::Released);
}

#[tokio::test]
async fn test_background_dispatch_delivers() {
    let fx = Fixture::new().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let engine = RollupEngine::new(fx.store.clone(), Arc::new(ChannelNotifier(tx)));
    assert_eq!(engine.dispatch(), DispatchMode::Background);
    let item = fx.item("one", &[]).await;

    engine.transition_item(item.id, ItemStage::Released).await.unwrap();
    assert_eq!(fx.release_stage().await, ReleaseStage::Released);

    let delivered = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(delivered, Some(fx.release.id));
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let fx = Fixture::new().await;

    let err = fx.engine.transition_item(ItemId::new(), ItemStage::Dev).await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(ref m) if m == "Item not found"));

    let err = fx
        .engine
        .transition_prerequisite(PrerequisiteId::new(), PrerequisiteStage::Done)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(ref m) if m == "Prerequisite not found"));

    let err = fx
        .engine
        .transition_release(ReleaseId::new(), ReleaseStage::Released)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(ref m) if m == "Release not found"));
}

#[tokio::test]
async fn test_direct_release_transition_is_unchecked() {
    let fx = Fixture::new().await;
    fx.item("still in dev", &[]).await;

    let release = fx.engine.transition_release(fx.release.id, ReleaseStage::Released).await.unwrap();
    assert_eq!(release.stage, ReleaseStage::Released);
    assert_eq!(fx.notifier.count(), 0);

    let release = fx.engine.transition_release(fx.release.id, ReleaseStage::Planned).await.unwrap();
    assert_eq!(release.stage, ReleaseStage::Planned);
}
