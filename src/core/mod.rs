//! Core domain: credentials, queries, reset times, and logging.

pub mod credential;
pub mod http;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod reset_clock;
pub mod timezone;

pub use credential::{
    Credential, CredentialResolver, NoPrompt, Prompter, ResolvedCredential, ResolverContext,
    SourceKind, StdinPrompter,
};
pub use http::AnthropicClient;
pub use models::{
    ModelId, ModelUsage, QueryOutcome, RateLimitHeaders, RecordStatus, ResetInfo, RobotOutput,
    UsageRecord,
};
pub use pipeline::{UsageReport, collect_usage};
pub use query::{UsageQueryEngine, UsageTransport};
pub use reset_clock::ResetClock;
pub use timezone::{ResolvedTimezone, TimezoneSource};
