use crate::Release;
use serde::{Deserialize, Serialize};

/// Maximum number of released entries returned in [`ReleaseListing::historical`].
pub const HISTORY_LIMIT: usize = 10;

/// A product's releases split into what is still coming and what has shipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseListing {
    /// Not yet released, earliest target date first.
    pub upcoming: Vec<Release>,
    /// Released, newest target date first, at most [`HISTORY_LIMIT`] entries.
    pub historical: Vec<Release>,
}

impl ReleaseListing {
    pub fn from_releases(releases: Vec<Release>) -> Self {
        let (mut historical, mut upcoming): (Vec<_>, Vec<_>) =
            releases.into_iter().partition(|r| r.stage.is_released());

        upcoming.sort_by_key(|r| r.target_date);
        historical.sort_by(|a, b| b.target_date.cmp(&a.target_date));
        historical.truncate(HISTORY_LIMIT);

        Self { upcoming, historical }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProductId, ReleaseId, ReleaseStage};
    use chrono::{NaiveDate, Utc};

    fn release(product_id: ProductId, date: (i32, u32, u32), stage: ReleaseStage) -> Release {
        Release {
            id: ReleaseId::new(),
            product_id,
            name: format!("{}-{}-{}", date.0, date.1, date.2),
            description: None,
            target_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            stage,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_split_upcoming_and_historical() {
        let product = ProductId::new();
        let listing = ReleaseListing::from_releases(vec![
            release(product, (2024, 1, 1), ReleaseStage::Released),
            release(product, (2025, 6, 1), ReleaseStage::Planned),
            release(product, (2023, 1, 1), ReleaseStage::Released),
        ]);

        let upcoming: Vec<_> = listing.upcoming.iter().map(|r| r.name.as_str()).collect();
        let historical: Vec<_> = listing.historical.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(upcoming, vec!["2025-6-1"]);
        assert_eq!(historical, vec!["2024-1-1", "2023-1-1"]);
    }

    #[test]
    fn test_history_is_capped() {
        let product = ProductId::new();
        let releases =
            (1..=12).map(|m| release(product, (2020, m, 1), ReleaseStage::Released)).collect();
        let listing = ReleaseListing::from_releases(releases);

        assert_eq!(listing.historical.len(), HISTORY_LIMIT);
        assert_eq!(listing.historical[0].name, "2020-12-1");
        assert!(listing.upcoming.is_empty());
    }

    #[test]
    fn test_empty_listing() {
        let listing = ReleaseListing::from_releases(Vec::new());
        assert_eq!(listing, ReleaseListing::default());
    }
}
