use serde::Serialize;
use tracker_core::{ItemType, Product, Release, ReleaseItem};

/// Everything a notifier needs to announce a completed release.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseSummary {
    pub product: Product,
    pub release: Release,
    pub items: Vec<ReleaseItem>,
}

impl ReleaseSummary {
    /// Items grouped by type, groups ordered by first appearance.
    pub fn groups(&self) -> Vec<(ItemType, Vec<&ReleaseItem>)> {
        let mut groups: Vec<(ItemType, Vec<&ReleaseItem>)> = Vec::new();
        for item in &self.items {
            match groups.iter_mut().find(|(item_type, _)| *item_type == item.item_type) {
                Some((_, members)) => members.push(item),
                None => groups.push((item.item_type, vec![item])),
            }
        }
        groups
    }

    /// Target date in the long form used by announcements, e.g. `Tue Dec 31 2024`.
    pub fn display_date(&self) -> String {
        self.release.target_date.format("%a %b %d %Y").to_string()
    }
}
