//! Test utilities for anthropic-usage.
//!
//! Shared factories, a scripted transport, a temp directory helper, and
//! assertion macros for unit and integration tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use anthropic_usage::test_utils::*;
//!
//! let transport = MockTransport::new()
//!     .with_headers(ModelId::Claude3Opus, make_test_headers(100_000, 25_000, reset));
//! let dir = TestDir::new();
//! dir.create_file("config.toml", "[anthropic]\napi_key = \"sk-test\"\n");
//! ```

use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::core::credential::{Credential, Prompter};
use crate::core::models::{ModelId, ModelUsage, RateLimitHeaders, UsageRecord};
use crate::core::query::UsageTransport;
use crate::error::{Result, UsageError};

// =============================================================================
// Test Data Factories
// =============================================================================

/// Fixed instant used as "now" across tests: 2024-11-02 20:00:00 UTC.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 2, 20, 0, 0)
        .single()
        .expect("valid fixed instant")
}

/// Raw headers as the API would send them.
#[must_use]
pub fn make_test_headers(limit: u64, remaining: u64, reset: DateTime<Utc>) -> RateLimitHeaders {
    RateLimitHeaders {
        tokens_limit: Some(limit.to_string()),
        tokens_remaining: Some(remaining.to_string()),
        tokens_reset: Some(reset.to_rfc3339()),
        requests_limit: Some("50".to_string()),
        requests_remaining: Some("49".to_string()),
    }
}

/// Quota figures resetting `reset_in` after [`test_now`].
#[must_use]
pub fn make_test_usage(limit: u64, remaining: u64, reset_in: TimeDelta) -> ModelUsage {
    ModelUsage {
        total_tokens: limit,
        remaining_tokens: remaining,
        reset_instant: test_now() + reset_in,
        requests_limit: None,
        requests_remaining: None,
        reset: None,
    }
}

/// Successful record, 100,000 total / 25,000 left, resetting in two hours.
#[must_use]
pub fn make_test_success_record(model: ModelId) -> UsageRecord {
    UsageRecord::success(model, make_test_usage(100_000, 25_000, TimeDelta::hours(2)))
}

#[must_use]
pub fn make_test_failed_record(model: ModelId, detail: &str) -> UsageRecord {
    UsageRecord::failed(model, detail)
}

/// Config file content holding `key`.
#[must_use]
pub fn make_test_config_toml(key: &str) -> String {
    format!("[anthropic]\napi_key = \"{key}\"\n")
}

// =============================================================================
// Mock Transport
// =============================================================================

/// Scripted response for one model.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Headers(RateLimitHeaders),
    Network(String),
    Status(u16, String),
    Timeout(u64),
}

/// Transport returning canned responses and recording every call.
///
/// Models without a scripted response fail with a network error.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: HashMap<ModelId, MockResponse>,
    delays: HashMap<ModelId, Duration>,
    calls: Mutex<Vec<(ModelId, String)>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_headers(mut self, model: ModelId, headers: RateLimitHeaders) -> Self {
        self.responses.insert(model, MockResponse::Headers(headers));
        self
    }

    #[must_use]
    pub fn with_response(mut self, model: ModelId, response: MockResponse) -> Self {
        self.responses.insert(model, response);
        self
    }

    /// Delay the response for `model`, to shuffle completion order.
    #[must_use]
    pub fn with_delay(mut self, model: ModelId, delay: Duration) -> Self {
        self.delays.insert(model, delay);
        self
    }

    /// Models queried so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the call log lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<ModelId> {
        self.calls
            .lock()
            .expect("call log lock")
            .iter()
            .map(|(m, _)| *m)
            .collect()
    }

    /// Key fingerprints seen, one per call.
    ///
    /// # Panics
    ///
    /// Panics if the call log lock is poisoned.
    #[must_use]
    pub fn fingerprints(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("call log lock")
            .iter()
            .map(|(_, f)| f.clone())
            .collect()
    }
}

impl UsageTransport for MockTransport {
    fn fetch_rate_limits(
        &self,
        credential: &Credential,
        model: ModelId,
    ) -> impl Future<Output = Result<RateLimitHeaders>> + Send {
        self.calls
            .lock()
            .expect("call log lock")
            .push((model, credential.fingerprint()));
        let response = self.responses.get(&model).cloned();
        let delay = self.delays.get(&model).copied();

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match response {
                Some(MockResponse::Headers(headers)) => Ok(headers),
                Some(MockResponse::Network(msg)) => Err(UsageError::Network(msg)),
                Some(MockResponse::Status(status, message)) => {
                    Err(UsageError::ApiStatus { status, message })
                }
                Some(MockResponse::Timeout(secs)) => Err(UsageError::Timeout(secs)),
                None => Err(UsageError::Network("no scripted response".to_string())),
            }
        }
    }
}

// =============================================================================
// Scripted Prompter
// =============================================================================

/// Prompter that replays one answer and counts how often it was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answer: Option<String>,
    asked: Mutex<usize>,
}

impl ScriptedPrompter {
    #[must_use]
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            asked: Mutex::new(0),
        }
    }

    /// Prompter simulating closed stdin.
    #[must_use]
    pub fn closed() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the counter lock is poisoned.
    #[must_use]
    pub fn times_asked(&self) -> usize {
        *self.asked.lock().expect("prompt counter lock")
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&self, _message: &str) -> Option<String> {
        *self.asked.lock().expect("prompt counter lock") += 1;
        self.answer.clone()
    }
}

// =============================================================================
// Test Directory
// =============================================================================

/// A temporary directory that is removed on drop.
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Create a file, with parent directories as needed.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.inner.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes())
            .expect("Failed to write test file");
        path
    }

    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    pub fn create_dir(&self, name: &str) -> PathBuf {
        let path = self.inner.path().join(name);
        fs::create_dir_all(&path).expect("Failed to create test directory");
        path
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.inner.path().join(name))
    }

    #[must_use]
    pub fn file_exists(&self, name: &str) -> bool {
        self.inner.path().join(name).exists()
    }

    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a string contains a substring.
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected string to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
}

/// Assert that a string does not contain a substring.
#[macro_export]
macro_rules! assert_not_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            !haystack.contains(needle),
            "Expected string NOT to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
}

/// Assert that a string parses as JSON.
#[macro_export]
macro_rules! assert_json_valid {
    ($json:expr) => {
        let json = $json;
        if let Err(e) = serde_json::from_str::<serde_json::Value>(json) {
            panic!("Expected valid JSON, but parsing failed: {}\n\nJSON string:\n{}", e, json);
        }
    };
}

/// Assert that a string contains ANSI escape codes.
#[macro_export]
macro_rules! assert_ansi_codes {
    ($text:expr) => {
        let text = $text;
        assert!(
            text.contains('\x1b'),
            "Expected string to contain ANSI escape codes, but none found.\n\nActual string:\n{:?}",
            text
        );
    };
}

/// Assert that a string contains no ANSI escape codes.
#[macro_export]
macro_rules! assert_no_ansi_codes {
    ($text:expr) => {
        let text = $text;
        assert!(
            !text.contains('\x1b'),
            "Expected string to NOT contain ANSI escape codes.\n\nActual string:\n{:?}",
            text
        );
    };
}

/// Strip ANSI escape codes from a string.
#[must_use]
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}
