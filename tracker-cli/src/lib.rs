//! Process entry for the release tracker: argument parsing, store selection
//! and the HTTP listener.

pub mod cli;
pub mod serve;

pub use cli::{Cli, Commands, ServeArgs};
pub use serve::{run_migrate, run_serve};
