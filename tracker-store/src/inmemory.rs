use crate::ReleaseStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracker_core::{
    ItemId, ItemStage, NewPrerequisite, NewProduct, NewRelease, NewReleaseItem, Prerequisite,
    PrerequisiteId, PrerequisiteStage, Product, ProductId, Release, ReleaseId, ReleaseItem,
    ReleaseItemPatch, ReleaseStage, Result,
};

/// Rows in insertion order, one vector per table.
#[derive(Default)]
struct Tables {
    products: Vec<Product>,
    releases: Vec<Release>,
    items: Vec<ReleaseItem>,
    prerequisites: Vec<Prerequisite>,
}

impl Tables {
    fn release_mut(&mut self, id: ReleaseId) -> Option<&mut Release> {
        self.releases.iter_mut().find(|r| r.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut ReleaseItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    fn prerequisite_rows(&self, item_id: ItemId) -> impl Iterator<Item = &Prerequisite> {
        self.prerequisites.iter().filter(move |p| p.release_item_id == item_id)
    }
}

/// Store kept entirely in process memory.
///
/// A single lock guards every table, so each trait method is atomic.
#[derive(Clone, Default)]
pub struct InMemoryReleaseStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryReleaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_prerequisite_row(item_id: ItemId, prerequisite: NewPrerequisite) -> Prerequisite {
    Prerequisite {
        id: PrerequisiteId::new(),
        release_item_id: item_id,
        title: prerequisite.title,
        category: prerequisite.category,
        stage: PrerequisiteStage::Pending,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl ReleaseStore for InMemoryReleaseStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let row = Product { id: ProductId::new(), name: product.name, created_at: Utc::now() };
        self.tables.write().await.products.push(row.clone());
        Ok(row)
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.tables.read().await.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before {
            return Ok(false);
        }

        let releases: Vec<ReleaseId> =
            tables.releases.iter().filter(|r| r.product_id == id).map(|r| r.id).collect();
        let items: Vec<ItemId> = tables
            .items
            .iter()
            .filter(|i| releases.contains(&i.release_id))
            .map(|i| i.id)
            .collect();

        tables.prerequisites.retain(|p| !items.contains(&p.release_item_id));
        tables.items.retain(|i| !releases.contains(&i.release_id));
        tables.releases.retain(|r| r.product_id != id);
        Ok(true)
    }

    async fn create_release(&self, product_id: ProductId, release: NewRelease) -> Result<Release> {
        let mut tables = self.tables.write().await;
        if !tables.products.iter().any(|p| p.id == product_id) {
            return Err(ProductId::not_found());
        }

        let row = Release {
            id: ReleaseId::new(),
            product_id,
            name: release.name,
            description: release.description,
            target_date: release.target_date,
            stage: ReleaseStage::Planned,
            created_at: Utc::now(),
        };
        tables.releases.push(row.clone());
        Ok(row)
    }

    async fn list_releases(&self, product_id: ProductId) -> Result<Vec<Release>> {
        let tables = self.tables.read().await;
        let mut releases: Vec<Release> =
            tables.releases.iter().filter(|r| r.product_id == product_id).cloned().collect();
        releases.sort_by_key(|r| r.target_date);
        Ok(releases)
    }

    async fn get_release(&self, id: ReleaseId) -> Result<Option<Release>> {
        Ok(self.tables.read().await.releases.iter().find(|r| r.id == id).cloned())
    }

    async fn set_release_stage(
        &self,
        id: ReleaseId,
        stage: ReleaseStage,
    ) -> Result<Option<Release>> {
        let mut tables = self.tables.write().await;
        Ok(tables.release_mut(id).map(|release| {
            release.stage = stage;
            release.clone()
        }))
    }

    async fn complete_release(&self, id: ReleaseId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.release_mut(id) {
            Some(release) if !release.stage.is_released() => {
                release.stage = ReleaseStage::Released;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn create_item(
        &self,
        release_id: ReleaseId,
        item: NewReleaseItem,
    ) -> Result<ReleaseItem> {
        let mut tables = self.tables.write().await;
        if !tables.releases.iter().any(|r| r.id == release_id) {
            return Err(ReleaseId::not_found());
        }

        let row = ReleaseItem {
            id: ItemId::new(),
            release_id,
            title: item.title,
            description: item.description,
            item_type: item.item_type,
            stage: ItemStage::Dev,
            jira_link: item.jira_link,
            doc_link: item.doc_link,
            created_at: Utc::now(),
            prerequisites: None,
        };
        let prerequisites: Vec<Prerequisite> = item
            .prerequisites
            .into_iter()
            .map(|p| new_prerequisite_row(row.id, p))
            .collect();

        tables.items.push(row.clone());
        tables.prerequisites.extend(prerequisites.iter().cloned());
        Ok(row.with_prerequisites(prerequisites))
    }

    async fn list_items(&self, release_id: ReleaseId) -> Result<Vec<ReleaseItem>> {
        let tables = self.tables.read().await;
        Ok(tables.items.iter().filter(|i| i.release_id == release_id).cloned().collect())
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<ReleaseItem>> {
        Ok(self.tables.read().await.items.iter().find(|i| i.id == id).cloned())
    }

    async fn update_item(
        &self,
        id: ItemId,
        patch: ReleaseItemPatch,
    ) -> Result<Option<ReleaseItem>> {
        let mut tables = self.tables.write().await;
        Ok(tables.item_mut(id).map(|item| {
            patch.apply(item);
            item.clone()
        }))
    }

    async fn set_item_stage(&self, id: ItemId, stage: ItemStage) -> Result<Option<ReleaseItem>> {
        let mut tables = self.tables.write().await;
        Ok(tables.item_mut(id).map(|item| {
            item.stage = stage;
            item.clone()
        }))
    }

    async fn count_unreleased_items(&self, release_id: ReleaseId) -> Result<u64> {
        let tables = self.tables.read().await;
        let count = tables
            .items
            .iter()
            .filter(|i| i.release_id == release_id && !i.stage.is_released())
            .count();
        Ok(count as u64)
    }

    async fn create_prerequisite(
        &self,
        item_id: ItemId,
        prerequisite: NewPrerequisite,
    ) -> Result<Prerequisite> {
        let mut tables = self.tables.write().await;
        if !tables.items.iter().any(|i| i.id == item_id) {
            return Err(ItemId::not_found());
        }

        let row = new_prerequisite_row(item_id, prerequisite);
        tables.prerequisites.push(row.clone());
        Ok(row)
    }

    async fn list_prerequisites(&self, item_id: ItemId) -> Result<Vec<Prerequisite>> {
        let tables = self.tables.read().await;
        Ok(tables.prerequisite_rows(item_id).cloned().collect())
    }

    async fn set_prerequisite_stage(
        &self,
        id: PrerequisiteId,
        stage: PrerequisiteStage,
    ) -> Result<Option<Prerequisite>> {
        let mut tables = self.tables.write().await;
        Ok(tables.prerequisites.iter_mut().find(|p| p.id == id).map(|prerequisite| {
            prerequisite.stage = stage;
            prerequisite.clone()
        }))
    }

    async fn count_pending_prerequisites(&self, item_id: ItemId) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.prerequisite_rows(item_id).filter(|p| !p.stage.is_done()).count() as u64)
    }
}
