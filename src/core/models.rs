//! Core data models.
//!
//! [`ModelId`] is the closed set of models the tool knows how to query, and
//! [`UsageRecord`] is the per-model result that flows from the query engine
//! through the reset clock to the renderers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, UsageError};

// =============================================================================
// Model Identifier
// =============================================================================

/// Supported Claude models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "claude-3-5-sonnet-20241022")]
    Claude35Sonnet,
    #[serde(rename = "claude-3-5-haiku-20241022")]
    Claude35Haiku,
    #[serde(rename = "claude-3-opus-20240229")]
    Claude3Opus,
    #[serde(rename = "claude-3-sonnet-20240229")]
    Claude3Sonnet,
    #[serde(rename = "claude-3-haiku-20240307")]
    Claude3Haiku,
}

impl ModelId {
    /// All models in query and display order.
    pub const ALL: &'static [Self] = &[
        Self::Claude35Sonnet,
        Self::Claude35Haiku,
        Self::Claude3Opus,
        Self::Claude3Sonnet,
        Self::Claude3Haiku,
    ];

    /// Model name as sent on the wire.
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::Claude35Sonnet => "claude-3-5-sonnet-20241022",
            Self::Claude35Haiku => "claude-3-5-haiku-20241022",
            Self::Claude3Opus => "claude-3-opus-20240229",
            Self::Claude3Sonnet => "claude-3-sonnet-20240229",
            Self::Claude3Haiku => "claude-3-haiku-20240307",
        }
    }

    /// Display name for human output.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Claude35Sonnet => "Claude 3.5 Sonnet",
            Self::Claude35Haiku => "Claude 3.5 Haiku",
            Self::Claude3Opus => "Claude 3 Opus",
            Self::Claude3Sonnet => "Claude 3 Sonnet",
            Self::Claude3Haiku => "Claude 3 Haiku",
        }
    }

    /// Parse from a wire name, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidModel`] for names outside [`ModelId::ALL`].
    pub fn from_api_name(name: &str) -> Result<Self> {
        let wanted = name.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.api_name() == wanted)
            .ok_or_else(|| UsageError::InvalidModel(name.trim().to_string()))
    }

    /// Resolve a user selection to models in declared order.
    ///
    /// An empty selection means every model. Duplicates collapse.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidModel`] on the first unknown name.
    pub fn select(names: &[String]) -> Result<Vec<Self>> {
        if names.is_empty() {
            return Ok(Self::ALL.to_vec());
        }

        let wanted = names
            .iter()
            .map(|n| Self::from_api_name(n))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::ALL
            .iter()
            .copied()
            .filter(|m| wanted.contains(m))
            .collect())
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_name())
    }
}

// =============================================================================
// Rate Limit Headers
// =============================================================================

/// Raw rate limit values as returned by the transport, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub tokens_limit: Option<String>,
    pub tokens_remaining: Option<String>,
    pub tokens_reset: Option<String>,
    pub requests_limit: Option<String>,
    pub requests_remaining: Option<String>,
}

// =============================================================================
// Usage Record
// =============================================================================

/// Quota figures for a model whose query succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    pub total_tokens: u64,
    pub remaining_tokens: u64,
    pub reset_instant: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_limit: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_remaining: Option<u64>,

    /// Filled in by the reset clock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<ResetInfo>,
}

impl ModelUsage {
    /// Percentage of the token limit still available.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn remaining_percent(&self) -> f64 {
        if self.total_tokens == 0 {
            return 0.0;
        }
        (self.remaining_tokens as f64 / self.total_tokens as f64) * 100.0
    }
}

/// Countdown and localized reset time for a successful record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResetInfo {
    /// Whole seconds until reset, never negative.
    pub time_remaining_secs: i64,
    /// Days/hours/minutes breakdown, e.g. `1 hour 1 minute`.
    pub time_remaining: String,
    /// Reset instant in the resolved timezone.
    pub local_reset_time: String,
}

/// Outcome of querying one model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueryOutcome {
    Success(ModelUsage),
    Failed {
        #[serde(rename = "errorDetail")]
        error_detail: String,
    },
}

/// Success or failure marker for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Success,
    Failed,
}

/// One row of the final report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageRecord {
    pub model: ModelId,
    #[serde(flatten)]
    pub outcome: QueryOutcome,
}

impl UsageRecord {
    /// Build a successful record.
    #[must_use]
    pub const fn success(model: ModelId, usage: ModelUsage) -> Self {
        Self {
            model,
            outcome: QueryOutcome::Success(usage),
        }
    }

    /// Build a failed record. An empty detail is replaced with a generic one.
    #[must_use]
    pub fn failed(model: ModelId, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let error_detail = if detail.trim().is_empty() {
            "query failed".to_string()
        } else {
            detail
        };
        Self {
            model,
            outcome: QueryOutcome::Failed { error_detail },
        }
    }

    #[must_use]
    pub const fn status(&self) -> RecordStatus {
        match self.outcome {
            QueryOutcome::Success(_) => RecordStatus::Success,
            QueryOutcome::Failed { .. } => RecordStatus::Failed,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, QueryOutcome::Success(_))
    }

    /// Quota figures, present only for successful records.
    #[must_use]
    pub const fn usage(&self) -> Option<&ModelUsage> {
        match &self.outcome {
            QueryOutcome::Success(usage) => Some(usage),
            QueryOutcome::Failed { .. } => None,
        }
    }

    /// Failure cause, present only for failed records.
    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        match &self.outcome {
            QueryOutcome::Success(_) => None,
            QueryOutcome::Failed { error_detail } => Some(error_detail),
        }
    }
}

// =============================================================================
// Robot Output
// =============================================================================

/// Schema identifier carried by every JSON document.
pub const SCHEMA_VERSION: &str = "anthropic-usage.v1";

/// Envelope for machine-readable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,

    /// One line per failed model, `model: detail`.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl<T> RobotOutput<T> {
    pub fn new(command: impl Into<String>, data: T, generated_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at,
            command: command.into(),
            data,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}
