pub mod config;
pub mod error;
pub mod extract;
pub mod rest;

pub use config::{SecurityConfig, ServerConfig};
pub use error::{ApiError, ApiResultExt};
pub use extract::ApiJson;
pub use rest::create_app;
