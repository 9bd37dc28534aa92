//! Closed value sets for stages, item types and prerequisite categories.
//!
//! Values arrive over the wire as plain strings. They are parsed once at the
//! boundary with [`FromStr`]; anything outside the set is a
//! [`TrackerError::Validation`].

use crate::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident, $invalid:literal { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Parses the wire form, failing with a validation error.
            pub fn parse(raw: &str) -> Result<Self> {
                raw.parse()
            }
        }

        impl FromStr for $name {
            type Err = TrackerError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(TrackerError::validation($invalid)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_set!(
    /// Lifecycle of a release. `Released` is terminal for the automatic cascade.
    ReleaseStage, "Invalid status" {
        Planned => "PLANNED",
        Released => "RELEASED",
    }
);

closed_set!(
    /// Lifecycle of a release item. Ordering between stages is not enforced.
    ItemStage, "Invalid status" {
        Dev => "DEV",
        PreProd => "PRE_PROD",
        Released => "RELEASED",
    }
);

closed_set!(
    PrerequisiteStage, "Invalid status" {
        Pending => "PENDING",
        Done => "DONE",
    }
);

closed_set!(
    ItemType, "Invalid type" {
        Feature => "FEATURE",
        BugFix => "BUG_FIX",
    }
);

closed_set!(
    PrerequisiteCategory, "Invalid category" {
        EnvVar => "ENV_VAR",
        Migration => "MIGRATION",
        Infra => "INFRA",
        Permissions => "PERMISSIONS",
    }
);

impl Default for ReleaseStage {
    fn default() -> Self {
        Self::Planned
    }
}

impl Default for ItemStage {
    fn default() -> Self {
        Self::Dev
    }
}

impl Default for PrerequisiteStage {
    fn default() -> Self {
        Self::Pending
    }
}

impl ItemStage {
    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }
}

impl ReleaseStage {
    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }
}

impl PrerequisiteStage {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}
