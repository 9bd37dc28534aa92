pub mod items;
pub mod prerequisites;
pub mod products;
pub mod releases;

pub use items::ItemsController;
pub use prerequisites::PrerequisitesController;
pub use products::ProductsController;
pub use releases::ReleasesController;

use crate::extract::loose_string;
use serde::Deserialize;

/// Body of every `PATCH …/status` endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default, deserialize_with = "loose_string")]
    pub status: Option<String>,
}

/// Treats blank strings the same as a missing field.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
