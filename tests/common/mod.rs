//! Common helpers for integration tests.
//!
//! - `logger`: structured test logging
//! - `wire`: canned Messages API responses for wiremock

pub mod logger;
pub mod wire;
