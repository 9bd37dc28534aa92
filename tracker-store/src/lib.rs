pub mod inmemory;
pub mod service;

#[cfg(feature = "database")]
pub mod database;

pub use inmemory::InMemoryReleaseStore;
pub use service::ReleaseStore;

#[cfg(feature = "database")]
pub use database::DatabaseReleaseStore;
