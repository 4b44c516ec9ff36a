//! Fix suggestions for errors that end a run.

use crate::core::models::ModelId;
use crate::storage::paths::{CONFIG_FILE_NAME, HOME_CONFIG_DIR};

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct FixSuggestion {
    /// Fix commands or snippets in order of preference.
    pub commands: Vec<String>,

    /// Explanation of why this error occurred.
    pub context: String,

    /// Tips to prevent this error in the future.
    pub prevention: Option<String>,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }
}

/// Suggestions when no source produced an API key.
#[must_use]
pub fn no_credential_suggestions(searched: &[String]) -> Vec<FixSuggestion> {
    let context = if searched.is_empty() {
        "No API key source produced a value.".to_string()
    } else {
        format!("Searched: {}.", searched.join(", "))
    };

    vec![
        FixSuggestion::new(
            vec!["export ANTHROPIC_API_KEY=sk-ant-...".to_string()],
            context,
        ),
        FixSuggestion::new(
            vec![format!(
                "mkdir -p ~/{HOME_CONFIG_DIR} && printf '[anthropic]\\napi_key = \"sk-ant-...\"\\n' > ~/{HOME_CONFIG_DIR}/{CONFIG_FILE_NAME}"
            )],
            "Store the key in a config file instead of the environment.",
        )
        .with_prevention("Blank values are ignored; make sure the key is not empty."),
    ]
}

/// Suggestions for a model name outside the supported set.
#[must_use]
pub fn invalid_model_suggestions(name: &str) -> Vec<FixSuggestion> {
    let known: Vec<&str> = ModelId::ALL.iter().map(|m| m.api_name()).collect();
    vec![FixSuggestion::new(
        vec!["anthropic-usage models".to_string()],
        format!("'{name}' is not supported. Known models: {}", known.join(", ")),
    )]
}

/// Suggestions for an unknown timezone override.
#[must_use]
pub fn invalid_timezone_suggestions(name: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["anthropic-usage --timezone America/New_York".to_string()],
        format!("'{name}' is not an IANA timezone name."),
    )]
}

/// Suggestions for a non-success HTTP status.
#[must_use]
pub fn api_status_suggestions(status: u16) -> Vec<FixSuggestion> {
    match status {
        401 | 403 => vec![
            FixSuggestion::new(
                vec!["echo $ANTHROPIC_API_KEY | cut -c1-7".to_string()],
                "The API key was rejected. Check that it is current and not revoked.",
            )
            .with_prevention("Keys in config files take precedence over the environment."),
        ],
        429 => vec![FixSuggestion::new(
            Vec::new(),
            "The account is currently rate limited. Wait for the reset time shown.",
        )],
        _ => Vec::new(),
    }
}

/// Suggestions for a request timeout.
#[must_use]
pub fn timeout_suggestions(seconds: u64) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("anthropic-usage --timeout {}", seconds.saturating_mul(2))],
        format!("The request did not finish within {seconds}s."),
    )]
}
