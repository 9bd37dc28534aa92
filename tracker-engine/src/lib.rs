//! Status rollup engine.
//!
//! Decides whether a stage transition is legal and applies the cascade it
//! triggers: once every item of a release is `RELEASED`, the release itself
//! becomes `RELEASED` and a notification goes out, at most once.

mod engine;

pub use engine::{DispatchMode, RollupEngine};
