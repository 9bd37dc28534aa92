//! Notifications sent when a release completes.
//!
//! The engine hands a [`ReleaseSummary`] to a [`ReleaseNotifier`]. Delivery is
//! best effort: callers log failures and carry on.

pub mod logging;
pub mod slack;
pub mod summary;

pub use logging::LogNotifier;
pub use slack::SlackNotifier;
pub use summary::ReleaseSummary;

use async_trait::async_trait;
use std::sync::Arc;
use tracker_core::Result;

#[async_trait]
pub trait ReleaseNotifier: Send + Sync {
    async fn notify(&self, summary: &ReleaseSummary) -> Result<()>;
}

/// Slack when a webhook URL is configured, log-only otherwise.
pub fn notifier_from_webhook(webhook_url: Option<String>) -> Result<Arc<dyn ReleaseNotifier>> {
    match webhook_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => Ok(Arc::new(SlackNotifier::new(url)?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}
