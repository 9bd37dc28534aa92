//! # Tracker Telemetry
//!
//! Structured logging with `tracing`, optionally exported over OTLP.
//!
//! ```rust
//! use tracker_telemetry::{info, init_telemetry};
//!
//! init_telemetry("release-tracker").expect("telemetry");
//! info!("tracker ready");
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{LogFormat, init_telemetry, init_telemetry_with, init_with_otlp, shutdown_telemetry};
pub use spans::*;
