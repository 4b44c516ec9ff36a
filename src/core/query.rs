//! Per-model rate limit queries.
//!
//! [`UsageQueryEngine`] fans a single credential out to every selected
//! model, normalizes each response into a [`UsageRecord`], and never lets
//! one model's failure affect another.

use std::future::Future;

use chrono::{DateTime, NaiveDateTime, Utc};
use futures::future::join_all;

use crate::core::credential::Credential;
use crate::core::http::{
    HEADER_REQUESTS_LIMIT, HEADER_REQUESTS_REMAINING, HEADER_TOKENS_LIMIT,
    HEADER_TOKENS_REMAINING, HEADER_TOKENS_RESET,
};
use crate::core::models::{ModelId, ModelUsage, RateLimitHeaders, UsageRecord};
use crate::error::{Result, UsageError};

/// Something that can ask the API for one model's rate limit headers.
///
/// Implemented by the HTTP client and by test doubles.
pub trait UsageTransport {
    /// Fetch raw rate limit values for `model`.
    fn fetch_rate_limits(
        &self,
        credential: &Credential,
        model: ModelId,
    ) -> impl Future<Output = Result<RateLimitHeaders>> + Send;
}

/// Queries a fixed list of models with one credential.
#[derive(Debug)]
pub struct UsageQueryEngine<T> {
    transport: T,
    models: Vec<ModelId>,
}

impl<T: UsageTransport + Sync> UsageQueryEngine<T> {
    /// Engine covering every known model.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_models(transport, ModelId::ALL.to_vec())
    }

    #[must_use]
    pub const fn with_models(transport: T, models: Vec<ModelId>) -> Self {
        Self { transport, models }
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Query every model concurrently.
    ///
    /// Returns exactly one record per model, in model order. Failures are
    /// captured as failed records rather than returned.
    pub async fn query_all(&self, credential: &Credential) -> Vec<UsageRecord> {
        tracing::debug!(
            models = self.models.len(),
            key = %credential.fingerprint(),
            "Querying rate limits"
        );

        let futures = self
            .models
            .iter()
            .map(|&model| self.query_one(credential, model));
        let records = join_all(futures).await;

        let failed = records.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            total = records.len(),
            failed,
            "Rate limit queries complete"
        );
        records
    }

    /// Query a single model and turn any error into a failed record.
    pub async fn query_one(&self, credential: &Credential, model: ModelId) -> UsageRecord {
        let result = self
            .transport
            .fetch_rate_limits(credential, model)
            .await
            .and_then(|headers| normalize(&headers));

        match result {
            Ok(usage) => {
                tracing::debug!(
                    model = %model,
                    total = usage.total_tokens,
                    remaining = usage.remaining_tokens,
                    "Query succeeded"
                );
                UsageRecord::success(model, usage)
            }
            Err(e) => {
                tracing::warn!(
                    model = %model,
                    error = %e,
                    code = e.error_code(),
                    "Query failed"
                );
                UsageRecord::failed(model, e.short_detail())
            }
        }
    }
}

/// Validate raw header values into quota figures.
///
/// Token counts and the reset instant are required. Request counts are
/// informational and dropped when absent or malformed.
///
/// # Errors
///
/// Returns an error if a required value is missing or malformed, or if the
/// remaining count exceeds the limit.
pub fn normalize(headers: &RateLimitHeaders) -> Result<ModelUsage> {
    let total_tokens = required_count(headers.tokens_limit.as_deref(), HEADER_TOKENS_LIMIT)?;
    let remaining_tokens =
        required_count(headers.tokens_remaining.as_deref(), HEADER_TOKENS_REMAINING)?;

    if remaining_tokens > total_tokens {
        return Err(UsageError::RemainingExceedsLimit {
            remaining: remaining_tokens,
            limit: total_tokens,
        });
    }

    let reset_raw = headers
        .tokens_reset
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| UsageError::MissingRateLimit(HEADER_TOKENS_RESET.to_string()))?;
    let reset_instant = parse_reset_instant(reset_raw)?;

    Ok(ModelUsage {
        total_tokens,
        remaining_tokens,
        reset_instant,
        requests_limit: optional_count(headers.requests_limit.as_deref(), HEADER_REQUESTS_LIMIT),
        requests_remaining: optional_count(
            headers.requests_remaining.as_deref(),
            HEADER_REQUESTS_REMAINING,
        ),
        reset: None,
    })
}

/// Parse an RFC 3339 reset instant. Offset-less timestamps are read as UTC.
///
/// # Errors
///
/// Returns [`UsageError::InvalidResetInstant`] if neither form matches.
pub fn parse_reset_instant(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| UsageError::InvalidResetInstant(raw.to_string()))
}

fn required_count(value: Option<&str>, header: &str) -> Result<u64> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| UsageError::MissingRateLimit(header.to_string()))?;
    value.parse().map_err(|_| UsageError::InvalidRateLimit {
        header: header.to_string(),
        value: value.to_string(),
    })
}

fn optional_count(value: Option<&str>, header: &str) -> Option<u64> {
    let value = value?.trim();
    match value.parse() {
        Ok(count) => Some(count),
        Err(_) => {
            tracing::debug!(header, value, "Ignoring malformed request count");
            None
        }
    }
}
