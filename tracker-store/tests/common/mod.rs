#![allow(dead_code)]

use chrono::NaiveDate;
use tracker_core::{
    ItemId, ItemStage, ItemType, NewPrerequisite, NewProduct, NewRelease, NewReleaseItem,
    PrerequisiteCategory, PrerequisiteStage, Product, ProductId, Release, ReleaseId,
    ReleaseItemPatch, ReleaseStage, TrackerError,
};
use tracker_store::ReleaseStore;

pub fn new_release(name: &str, date: (i32, u32, u32)) -> NewRelease {
    NewRelease {
        name: name.to_string(),
        description: None,
        target_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
    }
}

pub fn new_item(title: &str, prerequisites: &[(&str, PrerequisiteCategory)]) -> NewReleaseItem {
    NewReleaseItem {
        title: title.to_string(),
        description: Some("A new feature".to_string()),
        item_type: ItemType::Feature,
        jira_link: None,
        doc_link: None,
        prerequisites: prerequisites
            .iter()
            .map(|(title, category)| NewPrerequisite { title: title.to_string(), category: *category })
            .collect(),
    }
}

pub async fn seed_release(store: &dyn ReleaseStore) -> (Product, Release) {
    let product = store.create_product(NewProduct { name: "P".into() }).await.unwrap();
    let release =
        store.create_release(product.id, new_release("Winter", (2024, 12, 31))).await.unwrap();
    (product, release)
}

pub async fn product_roundtrip(store: &dyn ReleaseStore) {
    let created = store.create_product(NewProduct { name: "Payments".into() }).await.unwrap();
    let fetched = store.get_product(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Payments");
    assert_eq!(fetched.id, created.id);

    let all = store.list_products().await.unwrap();
    assert!(all.iter().any(|p| p.id == created.id));
    assert!(store.get_product(ProductId::new()).await.unwrap().is_none());
}

pub async fn release_requires_product(store: &dyn ReleaseStore) {
    let err = store
        .create_release(ProductId::new(), new_release("Orphan", (2025, 1, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(ref m) if m == "Product not found"));
}

pub async fn releases_listed_by_target_date(store: &dyn ReleaseStore) {
    let product = store.create_product(NewProduct { name: "P".into() }).await.unwrap();
    for (name, date) in [("b", (2025, 6, 1)), ("c", (2026, 1, 1)), ("a", (2023, 1, 1))] {
        store.create_release(product.id, new_release(name, date)).await.unwrap();
    }

    let names: Vec<String> =
        store.list_releases(product.id).await.unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    let created = store.list_releases(product.id).await.unwrap();
    assert!(created.iter().all(|r| r.stage == ReleaseStage::Planned));
}

pub async fn item_created_with_prerequisites(store: &dyn ReleaseStore) {
    let (_, release) = seed_release(store).await;
    let item = store
        .create_item(
            release.id,
            new_item(
                "Feature A",
                &[("Env Var", PrerequisiteCategory::EnvVar), ("Schema", PrerequisiteCategory::Migration)],
            ),
        )
        .await
        .unwrap();

    assert_eq!(item.stage, ItemStage::Dev);
    let prerequisites = item.prerequisites.clone().unwrap();
    assert_eq!(prerequisites.len(), 2);
    assert_eq!(prerequisites[0].title, "Env Var");
    assert_eq!(prerequisites[1].category, PrerequisiteCategory::Migration);
    assert!(prerequisites.iter().all(|p| p.stage == PrerequisiteStage::Pending));

    let stored = store.list_prerequisites(item.id).await.unwrap();
    assert_eq!(stored, prerequisites);
    assert_eq!(store.count_pending_prerequisites(item.id).await.unwrap(), 2);
}

pub async fn item_requires_release(store: &dyn ReleaseStore) {
    let err = store.create_item(ReleaseId::new(), new_item("Lost", &[])).await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(ref m) if m == "Release not found"));

    let err = store
        .create_prerequisite(
            ItemId::new(),
            NewPrerequisite { title: "x".into(), category: PrerequisiteCategory::Infra },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(ref m) if m == "Item not found"));
}

pub async fn item_patch_and_stage(store: &dyn ReleaseStore) {
    let (_, release) = seed_release(store).await;
    let item = store.create_item(release.id, new_item("Feature A", &[])).await.unwrap();

    let patched = store
        .update_item(
            item.id,
            ReleaseItemPatch {
                title: Some("Feature B".into()),
                jira_link: Some(Some("https://jira.example.com/REL-7".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(patched.title, "Feature B");
    assert_eq!(patched.description.as_deref(), Some("A new feature"));
    assert_eq!(patched.jira_link.as_deref(), Some("https://jira.example.com/REL-7"));
    assert_eq!(patched.stage, ItemStage::Dev);

    let cleared = store
        .update_item(item.id, ReleaseItemPatch { description: Some(None), ..Default::default() })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.jira_link.as_deref(), Some("https://jira.example.com/REL-7"));
    let fetched = store.get_item(item.id).await.unwrap().unwrap();
    assert_eq!(fetched.description, None);

    let staged = store.set_item_stage(item.id, ItemStage::PreProd).await.unwrap().unwrap();
    assert_eq!(staged.stage, ItemStage::PreProd);
    assert_eq!(staged.title, "Feature B");

    assert!(store.update_item(ItemId::new(), ReleaseItemPatch::default()).await.unwrap().is_none());
    assert!(store.set_item_stage(ItemId::new(), ItemStage::Dev).await.unwrap().is_none());
}

pub async fn counts_follow_stages(store: &dyn ReleaseStore) {
    let (_, release) = seed_release(store).await;
    let first = store
        .create_item(release.id, new_item("one", &[("Infra", PrerequisiteCategory::Infra)]))
        .await
        .unwrap();
    let second = store.create_item(release.id, new_item("two", &[])).await.unwrap();
    assert_eq!(store.count_unreleased_items(release.id).await.unwrap(), 2);

    store.set_item_stage(second.id, ItemStage::Released).await.unwrap();
    assert_eq!(store.count_unreleased_items(release.id).await.unwrap(), 1);

    let prerequisites = first.prerequisites.clone().unwrap();
    let done = store
        .set_prerequisite_stage(prerequisites[0].id, PrerequisiteStage::Done)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.stage, PrerequisiteStage::Done);
    assert_eq!(store.count_pending_prerequisites(first.id).await.unwrap(), 0);
}

pub async fn complete_release_happens_once(store: &dyn ReleaseStore) {
    let (_, release) = seed_release(store).await;

    assert!(store.complete_release(release.id).await.unwrap());
    assert!(!store.complete_release(release.id).await.unwrap());
    assert!(!store.complete_release(ReleaseId::new()).await.unwrap());

    let stored = store.get_release(release.id).await.unwrap().unwrap();
    assert_eq!(stored.stage, ReleaseStage::Released);

    // a direct write back to PLANNED re-arms the transition
    store.set_release_stage(release.id, ReleaseStage::Planned).await.unwrap().unwrap();
    assert!(store.complete_release(release.id).await.unwrap());
}

pub async fn delete_product_cascades(store: &dyn ReleaseStore) {
    let (product, release) = seed_release(store).await;
    let item = store
        .create_item(release.id, new_item("Feature A", &[("Perms", PrerequisiteCategory::Permissions)]))
        .await
        .unwrap();

    assert!(store.delete_product(product.id).await.unwrap());
    assert!(!store.delete_product(product.id).await.unwrap());

    assert!(store.get_release(release.id).await.unwrap().is_none());
    assert!(store.get_item(item.id).await.unwrap().is_none());
    assert!(store.list_prerequisites(item.id).await.unwrap().is_empty());
}
