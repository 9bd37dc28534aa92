//! # tracker-core
//!
//! Core types for the release tracker: products own releases, releases own
//! release items, and release items own prerequisites.
//!
//! - [`Product`], [`Release`], [`ReleaseItem`], [`Prerequisite`] - stored entities
//! - [`ReleaseStage`], [`ItemStage`], [`PrerequisiteStage`] - closed stage sets
//! - [`NewReleaseItem`], [`ReleaseItemPatch`], ... - validated inputs
//! - [`ReleaseListing`] - the upcoming/historical split of a product's releases
//! - [`TrackerError`] / [`Result`] - unified error handling

pub mod error;
pub mod ids;
pub mod inputs;
pub mod listing;
pub mod model;
pub mod stage;

pub use error::{Result, TrackerError};
pub use ids::{ItemId, PrerequisiteId, ProductId, ReleaseId};
pub use inputs::{NewPrerequisite, NewProduct, NewRelease, NewReleaseItem, ReleaseItemPatch};
pub use listing::{HISTORY_LIMIT, ReleaseListing};
pub use model::{Prerequisite, Product, Release, ReleaseDetail, ReleaseItem};
pub use stage::{ItemStage, ItemType, PrerequisiteCategory, PrerequisiteStage, ReleaseStage};
