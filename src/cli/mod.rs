//! CLI argument parsing and command dispatch.

pub mod args;
pub mod models;
pub mod usage;

pub use args::{Cli, Commands, OutputFormat, UsageArgs};
