use crate::{ReleaseNotifier, ReleaseSummary};
use async_trait::async_trait;
use tracker_core::Result;

/// Stand-in used when no webhook is configured: the announcement only goes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl ReleaseNotifier for LogNotifier {
    async fn notify(&self, summary: &ReleaseSummary) -> Result<()> {
        let titles: Vec<&str> = summary.items.iter().map(|i| i.title.as_str()).collect();
        tracing::info!(
            release.id = %summary.release.id,
            product = %summary.product.name,
            target_date = %summary.release.target_date,
            items = ?titles,
            "no webhook configured, skipping release notification"
        );
        Ok(())
    }
}
