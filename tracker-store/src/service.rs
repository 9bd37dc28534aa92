use async_trait::async_trait;
use tracker_core::{
    ItemId, ItemStage, NewPrerequisite, NewProduct, NewRelease, NewReleaseItem, Prerequisite,
    PrerequisiteId, PrerequisiteStage, Product, ProductId, Release, ReleaseId, ReleaseItem,
    ReleaseItemPatch, ReleaseStage, Result,
};

/// The authoritative store behind the tracker.
///
/// Ids and `created_at` are assigned by the store. Lookups and updates return
/// `Ok(None)` when the row does not exist; creating a child under a missing
/// parent fails with `TrackerError::NotFound`.
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    async fn create_product(&self, product: NewProduct) -> Result<Product>;
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;
    /// Removes the product and, by cascade, everything it owns.
    async fn delete_product(&self, id: ProductId) -> Result<bool>;

    async fn create_release(&self, product_id: ProductId, release: NewRelease) -> Result<Release>;
    /// Releases of a product, earliest target date first.
    async fn list_releases(&self, product_id: ProductId) -> Result<Vec<Release>>;
    async fn get_release(&self, id: ReleaseId) -> Result<Option<Release>>;
    async fn set_release_stage(&self, id: ReleaseId, stage: ReleaseStage)
    -> Result<Option<Release>>;
    /// Moves a release to `RELEASED` unless it already is.
    ///
    /// Returns `true` only for the call that performed the transition.
    async fn complete_release(&self, id: ReleaseId) -> Result<bool>;

    /// Inserts the item and its initial prerequisites as one atomic unit.
    async fn create_item(&self, release_id: ReleaseId, item: NewReleaseItem)
    -> Result<ReleaseItem>;
    async fn list_items(&self, release_id: ReleaseId) -> Result<Vec<ReleaseItem>>;
    async fn get_item(&self, id: ItemId) -> Result<Option<ReleaseItem>>;
    async fn update_item(&self, id: ItemId, patch: ReleaseItemPatch)
    -> Result<Option<ReleaseItem>>;
    async fn set_item_stage(&self, id: ItemId, stage: ItemStage) -> Result<Option<ReleaseItem>>;
    /// Items of the release whose stage is not `RELEASED`.
    async fn count_unreleased_items(&self, release_id: ReleaseId) -> Result<u64>;

    async fn create_prerequisite(
        &self,
        item_id: ItemId,
        prerequisite: NewPrerequisite,
    ) -> Result<Prerequisite>;
    async fn list_prerequisites(&self, item_id: ItemId) -> Result<Vec<Prerequisite>>;
    async fn set_prerequisite_stage(
        &self,
        id: PrerequisiteId,
        stage: PrerequisiteStage,
    ) -> Result<Option<Prerequisite>>;
    /// Prerequisites of the item whose stage is not `DONE`.
    async fn count_pending_prerequisites(&self, item_id: ItemId) -> Result<u64>;
}
