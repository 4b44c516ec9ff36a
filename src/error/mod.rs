//! Error types for anthropic-usage.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! - **Credential**: no usable API key, unreadable or incomplete config files
//! - **Network**: timeouts and transport failures for a model query
//! - **Api**: non-success responses and malformed rate limit data
//! - **Configuration**: invalid user input (unknown model, bad timezone)
//! - **Internal**: I/O and serialization failures
//!
//! Only [`UsageError::NoCredentialFound`] and configuration errors end a run.
//! Query errors are turned into failed rows, and config-file errors are
//! logged while resolution moves on to the next source.

pub mod suggestions;

use thiserror::Error;

pub use suggestions::FixSuggestion;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential lookup problems.
    Credential,
    /// Transport problems (timeout, connection).
    Network,
    /// Remote service returned an error or unusable data.
    Api,
    /// Invalid settings or arguments.
    Configuration,
    /// Unexpected I/O or serialization failures.
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Credential => "Credential error",
            Self::Network => "Network error",
            Self::Api => "API error",
            Self::Configuration => "Configuration error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Credential => "K",
            Self::Network => "N",
            Self::Api => "P",
            Self::Configuration => "C",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success, including runs where some model queries failed.
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Every credential source was exhausted
    NoCredential = 2,
    /// Invalid arguments or settings
    InvalidInput = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

/// Main error type for anthropic-usage operations.
#[derive(Error, Debug)]
pub enum UsageError {
    // ==========================================================================
    // Credential errors (Category: Credential)
    // ==========================================================================
    /// Every resolution source was tried and none produced a key.
    #[error("no API key found (searched {} source(s))", .searched.len())]
    NoCredentialFound {
        /// Human-readable labels of the sources that were tried.
        searched: Vec<String>,
    },

    /// A config file exists but could not be read or parsed.
    #[error("config file unreadable at {path}: {message}")]
    ConfigFileUnreadable { path: String, message: String },

    /// A config file parsed but has no credential entry.
    #[error("no [anthropic] api_key entry in {path}")]
    ConfigKeyMissing { path: String },

    /// A source held a key that was empty or whitespace-only.
    #[error("blank API key in {origin}")]
    BlankCredential { origin: String },

    // ==========================================================================
    // Network errors (Category: Network)
    // ==========================================================================
    /// Request timeout.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// Generic transport failure.
    #[error("network error: {0}")]
    Network(String),

    // ==========================================================================
    // API errors (Category: Api)
    // ==========================================================================
    /// Service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    ApiStatus { status: u16, message: String },

    /// A rate limit header was absent.
    #[error("missing rate limit header '{0}'")]
    MissingRateLimit(String),

    /// A rate limit header was present but not a non-negative integer.
    #[error("invalid value '{value}' for '{header}'")]
    InvalidRateLimit { header: String, value: String },

    /// Reset instant was not a recognizable timestamp.
    #[error("unparseable reset time '{0}'")]
    InvalidResetInstant(String),

    /// Remaining quota larger than the limit it belongs to.
    #[error("remaining tokens {remaining} exceed limit {limit}")]
    RemainingExceedsLimit { remaining: u64, limit: u64 },

    // ==========================================================================
    // Configuration errors (Category: Configuration)
    // ==========================================================================
    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Model name outside the supported set.
    #[error("unknown model: {0}")]
    InvalidModel(String),

    /// Timezone name that is not a known IANA zone.
    #[error("unknown timezone: {0}")]
    InvalidTimezone(String),

    /// Host timezone could not be determined. Recovered by falling back to UTC.
    #[error("timezone detection failed: {0}")]
    TimezoneDetection(String),

    // ==========================================================================
    // Internal errors (Category: Internal)
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UsageError {
    /// Map error to exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::NoCredentialFound { .. } => ExitCode::NoCredential,

            Self::Config(_) | Self::InvalidModel(_) | Self::InvalidTimezone(_) => {
                ExitCode::InvalidInput
            }

            Self::ConfigFileUnreadable { .. }
            | Self::ConfigKeyMissing { .. }
            | Self::BlankCredential { .. }
            | Self::Timeout(_)
            | Self::Network(_)
            | Self::ApiStatus { .. }
            | Self::MissingRateLimit(_)
            | Self::InvalidRateLimit { .. }
            | Self::InvalidResetInstant(_)
            | Self::RemainingExceedsLimit { .. }
            | Self::TimezoneDetection(_)
            | Self::Io(_)
            | Self::Json(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NoCredentialFound { .. }
            | Self::ConfigFileUnreadable { .. }
            | Self::ConfigKeyMissing { .. }
            | Self::BlankCredential { .. } => ErrorCategory::Credential,

            Self::Timeout(_) | Self::Network(_) => ErrorCategory::Network,

            Self::ApiStatus { .. }
            | Self::MissingRateLimit(_)
            | Self::InvalidRateLimit { .. }
            | Self::InvalidResetInstant(_)
            | Self::RemainingExceedsLimit { .. } => ErrorCategory::Api,

            Self::Config(_)
            | Self::InvalidModel(_)
            | Self::InvalidTimezone(_)
            | Self::TimezoneDetection(_) => ErrorCategory::Configuration,

            Self::Io(_) | Self::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `AU-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoCredentialFound { .. } => "AU-K001",
            Self::ConfigFileUnreadable { .. } => "AU-K002",
            Self::ConfigKeyMissing { .. } => "AU-K003",
            Self::BlankCredential { .. } => "AU-K004",

            Self::Timeout(_) => "AU-N001",
            Self::Network(_) => "AU-N099",

            Self::ApiStatus { .. } => "AU-P001",
            Self::MissingRateLimit(_) => "AU-P010",
            Self::InvalidRateLimit { .. } => "AU-P011",
            Self::InvalidResetInstant(_) => "AU-P012",
            Self::RemainingExceedsLimit { .. } => "AU-P013",

            Self::Config(_) => "AU-C001",
            Self::InvalidModel(_) => "AU-C010",
            Self::InvalidTimezone(_) => "AU-C011",
            Self::TimezoneDetection(_) => "AU-C020",

            Self::Io(_) => "AU-X001",
            Self::Json(_) => "AU-X002",
        }
    }

    /// Returns whether the error is potentially recoverable by retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::ApiStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns actionable fix suggestions for this error.
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self {
            Self::NoCredentialFound { searched } => {
                suggestions::no_credential_suggestions(searched)
            }
            Self::InvalidModel(name) => suggestions::invalid_model_suggestions(name),
            Self::InvalidTimezone(name) => suggestions::invalid_timezone_suggestions(name),
            Self::ApiStatus { status, .. } => suggestions::api_status_suggestions(*status),
            Self::Timeout(seconds) => suggestions::timeout_suggestions(*seconds),
            Self::Config(msg) => vec![FixSuggestion::new(
                vec!["anthropic-usage --help".to_string()],
                format!("Configuration error: {msg}"),
            )],
            _ => Vec::new(),
        }
    }

    /// Short single-line cause for a failed table row.
    #[must_use]
    pub fn short_detail(&self) -> String {
        match self {
            Self::Timeout(seconds) => format!("timed out after {seconds}s"),
            Self::Network(msg) => format!("network error: {msg}"),
            Self::ApiStatus { status, message } if message.is_empty() => format!("HTTP {status}"),
            other => other.to_string(),
        }
    }
}

/// Result type alias using `UsageError`.
pub type Result<T> = std::result::Result<T, UsageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_credential_maps_to_dedicated_exit_code() {
        let err = UsageError::NoCredentialFound {
            searched: vec!["env ANTHROPIC_API_KEY".to_string()],
        };
        assert_eq!(err.exit_code(), ExitCode::NoCredential);
        assert_eq!(err.category(), ErrorCategory::Credential);
        assert_eq!(err.error_code(), "AU-K001");
        assert!(err.to_string().contains("1 source"));
    }

    #[test]
    fn invalid_input_exit_code() {
        assert_eq!(
            UsageError::InvalidModel("gpt-4".to_string()).exit_code(),
            ExitCode::InvalidInput
        );
        assert_eq!(
            UsageError::InvalidTimezone("Mars/Base".to_string()).exit_code(),
            ExitCode::InvalidInput
        );
    }

    #[test]
    fn error_codes_are_prefixed_by_category() {
        let errors = [
            UsageError::ConfigKeyMissing {
                path: "config.toml".to_string(),
            },
            UsageError::Timeout(30),
            UsageError::MissingRateLimit("x".to_string()),
            UsageError::InvalidModel("x".to_string()),
            UsageError::Json(serde_json::from_str::<()>("{").unwrap_err()),
        ];
        for err in errors {
            let expected = format!("AU-{}", err.category().code_prefix());
            assert!(
                err.error_code().starts_with(&expected),
                "{} should start with {expected}",
                err.error_code()
            );
        }
    }

    #[test]
    fn retryable_statuses() {
        let rate_limited = UsageError::ApiStatus {
            status: 429,
            message: String::new(),
        };
        let unauthorized = UsageError::ApiStatus {
            status: 401,
            message: String::new(),
        };
        assert!(rate_limited.is_retryable());
        assert!(!unauthorized.is_retryable());
        assert!(UsageError::Timeout(5).is_retryable());
    }

    #[test]
    fn short_detail_is_compact() {
        let err = UsageError::ApiStatus {
            status: 404,
            message: String::new(),
        };
        assert_eq!(err.short_detail(), "HTTP 404");
        assert_eq!(UsageError::Timeout(10).short_detail(), "timed out after 10s");
    }

    #[test]
    fn internal_errors_exit_with_general_code() {
        let err = UsageError::from(std::io::Error::other("disk full"));
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.error_code(), "AU-X001");
        assert!(!err.is_retryable());
    }

    #[test]
    fn no_credential_has_suggestions() {
        let err = UsageError::NoCredentialFound { searched: vec![] };
        assert!(!err.fix_suggestions().is_empty());
    }
}
