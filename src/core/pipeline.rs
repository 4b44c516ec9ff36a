//! Usage collection pipeline.
//!
//! Runs the query engine, then annotates every record against a single
//! clock reading.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::credential::Credential;
use super::models::UsageRecord;
use super::query::{UsageQueryEngine, UsageTransport};
use super::reset_clock::ResetClock;

/// Everything the renderers and report writer need.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    /// IANA name of the zone used for reset times.
    pub timezone: String,
    pub generated_at: DateTime<Utc>,
    pub records: Vec<UsageRecord>,
}

impl UsageReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }
}

/// Query all models and annotate the results.
pub async fn collect_usage<T>(
    engine: &UsageQueryEngine<T>,
    credential: &Credential,
    clock: &ResetClock,
) -> UsageReport
where
    T: UsageTransport + Sync,
{
    let start = Instant::now();
    let records = engine.query_all(credential).await;
    let records = clock.annotate_all(records);

    tracing::debug!(
        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Usage collected"
    );

    UsageReport {
        timezone: clock.timezone().name().to_string(),
        generated_at: clock.now(),
        records,
    }
}
