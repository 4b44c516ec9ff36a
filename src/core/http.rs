//! HTTP transport for the Anthropic Messages API.
//!
//! Rate limits are only reported as response headers, so each query sends
//! the smallest possible message request and reads the headers back.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder};
use serde_json::json;

use crate::core::credential::Credential;
use crate::core::models::{ModelId, RateLimitHeaders};
use crate::core::query::UsageTransport;
use crate::error::{Result, UsageError};

/// Default timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Value of the `anthropic-version` request header.
pub const API_VERSION: &str = "2023-06-01";

/// Prompt sent with every probe request.
pub const PROBE_PROMPT: &str = "Check limits";

pub const HEADER_TOKENS_LIMIT: &str = "anthropic-ratelimit-tokens-limit";
pub const HEADER_TOKENS_REMAINING: &str = "anthropic-ratelimit-tokens-remaining";
pub const HEADER_TOKENS_RESET: &str = "anthropic-ratelimit-tokens-reset";
pub const HEADER_REQUESTS_LIMIT: &str = "anthropic-ratelimit-requests-limit";
pub const HEADER_REQUESTS_REMAINING: &str = "anthropic-ratelimit-requests-remaining";

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("anthropic-usage/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| UsageError::Network(e.to_string()))
}

/// Messages API client that reports rate limit headers.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl AnthropicClient {
    /// Create a client for `base_url` (no trailing `/v1`).
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Full URL of the messages endpoint.
    #[must_use]
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    async fn send_probe(&self, credential: &Credential, model: ModelId) -> Result<RateLimitHeaders> {
        let body = json!({
            "model": model.api_name(),
            "max_tokens": 1,
            "messages": [{ "role": "user", "content": PROBE_PROMPT }],
        });

        tracing::debug!(model = %model, url = %self.messages_url(), "Sending probe request");

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", credential.expose())
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UsageError::Timeout(self.timeout.as_secs())
                } else {
                    UsageError::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let headers = extract_rate_limits(response.headers());

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(UsageError::ApiStatus {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        Ok(headers)
    }
}

impl UsageTransport for AnthropicClient {
    fn fetch_rate_limits(
        &self,
        credential: &Credential,
        model: ModelId,
    ) -> impl std::future::Future<Output = Result<RateLimitHeaders>> + Send {
        self.send_probe(credential, model)
    }
}

/// Pull the rate limit headers out of a response.
#[must_use]
pub fn extract_rate_limits(headers: &HeaderMap) -> RateLimitHeaders {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    RateLimitHeaders {
        tokens_limit: get(HEADER_TOKENS_LIMIT),
        tokens_remaining: get(HEADER_TOKENS_REMAINING),
        tokens_reset: get(HEADER_TOKENS_RESET),
        requests_limit: get(HEADER_REQUESTS_LIMIT),
        requests_remaining: get(HEADER_REQUESTS_REMAINING),
    }
}

/// Best-effort `error.message` from an API error body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_default()
}
