//! Canned Messages API responses.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_KEY: &str = "sk-test";

/// 200 response carrying the rate limit headers.
pub fn rate_limited_ok(limit: u64, remaining: u64, reset: DateTime<Utc>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("anthropic-ratelimit-tokens-limit", limit.to_string().as_str())
        .insert_header(
            "anthropic-ratelimit-tokens-remaining",
            remaining.to_string().as_str(),
        )
        .insert_header("anthropic-ratelimit-tokens-reset", reset.to_rfc3339().as_str())
        .insert_header("anthropic-ratelimit-requests-limit", "50")
        .insert_header("anthropic-ratelimit-requests-remaining", "49")
        .set_body_json(json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": "O" }],
            "stop_reason": "max_tokens"
        }))
}

/// Error response in the API's JSON error shape.
pub fn api_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "type": "error",
        "error": { "type": "api_error", "message": message }
    }))
}

/// Mount `response` for requests naming `model`, authenticated with the test key.
pub async fn mount_model(server: &MockServer, model: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", TEST_KEY))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({ "model": model, "max_tokens": 1 })))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}
