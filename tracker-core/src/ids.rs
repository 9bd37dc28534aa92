//! Server-generated identifiers for every entity.

use crate::{Result, TrackerError};
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $missing:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            Display, From, Into,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parses an identifier taken from a request path.
            ///
            /// A malformed value can never name a stored row, so it is reported
            #[doc = concat!("as `NotFound(\"", $missing, "\")`.")]
            pub fn parse(raw: &str) -> Result<Self> {
                raw.parse::<Self>().map_err(|_| Self::not_found())
            }

            pub fn not_found() -> TrackerError {
                TrackerError::not_found($missing)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifies a [`Product`](crate::Product).
    ProductId,
    "Product not found"
);
entity_id!(
    /// Identifies a [`Release`](crate::Release).
    ReleaseId,
    "Release not found"
);
entity_id!(
    /// Identifies a [`ReleaseItem`](crate::ReleaseItem).
    ItemId,
    "Item not found"
);
entity_id!(
    /// Identifies a [`Prerequisite`](crate::Prerequisite).
    PrerequisiteId,
    "Prerequisite not found"
);
