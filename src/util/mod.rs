//! Utility functions.

pub mod env;
pub mod format;
pub mod time;

pub use format::{format_count, format_optional_count, format_percent};
pub use time::{format_breakdown, format_local};
