//! API key resolution.
//!
//! The key is looked up once per run in a fixed order, and the first
//! non-blank value wins:
//!
//! 1. `--config <PATH>` (only when given)
//! 2. `config.toml` in the working directory
//! 3. `config.toml` beside the executable
//! 4. `~/.anthropic_usage/config.toml`
//! 5. `config.toml` in the crate source directory
//! 6. `ANTHROPIC_API_KEY`
//! 7. interactive prompt on stdin
//!
//! Absent, unreadable or incomplete config files and blank values never stop
//! the search; they are logged at debug level and the next source is tried.
//! Nothing is written anywhere.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::error::{Result, UsageError};
use crate::storage::config::ConfigFile;
use crate::storage::paths::{AppPaths, ConfigCandidate, ConfigLocation};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const PROMPT_MESSAGE: &str = "Please enter your Anthropic API key: ";

// =============================================================================
// Credential
// =============================================================================

/// A non-blank API key. `Debug` never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw value, trimming whitespace. Blank input yields `None`.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// The secret itself, for request headers only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First 8 hex chars of the SHA-256 of the key. Safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..4])
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(sha256:{})", self.fingerprint())
    }
}

// =============================================================================
// Sources
// =============================================================================

/// Kind of source a key was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    ConfigFile(ConfigLocation),
    Environment,
    Prompt,
}

impl SourceKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ConfigFile(location) => location.label(),
            Self::Environment => "environment",
            Self::Prompt => "interactive prompt",
        }
    }
}

/// Reads a line of input for the last-resort prompt.
pub trait Prompter {
    /// Show `message` and return the entered line, or `None` when input is
    /// unavailable.
    fn prompt(&self, message: &str) -> Option<String>;
}

impl<P: Prompter + ?Sized> Prompter for &P {
    fn prompt(&self, message: &str) -> Option<String> {
        (**self).prompt(message)
    }
}

/// Prompts on stderr and reads one line from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn prompt(&self, message: &str) -> Option<String> {
        let mut stderr = io::stderr();
        write!(stderr, "{message}").ok()?;
        stderr.flush().ok()?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }
}

/// Never produces input. Used with `--no-prompt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn prompt(&self, _message: &str) -> Option<String> {
        None
    }
}

/// Snapshot of everything resolution reads from the host.
#[derive(Debug, Clone, Default)]
pub struct ResolverContext {
    /// Config files in lookup order.
    pub config_candidates: Vec<ConfigCandidate>,
    /// Value of `ANTHROPIC_API_KEY` at startup.
    pub env_value: Option<String>,
    /// Whether the prompt step runs at all.
    pub allow_prompt: bool,
}

impl ResolverContext {
    /// Capture config candidates and the environment variable.
    #[must_use]
    pub fn capture(paths: &AppPaths, explicit: Option<PathBuf>, allow_prompt: bool) -> Self {
        Self {
            config_candidates: paths.config_candidates(explicit.as_deref()),
            env_value: std::env::var(API_KEY_ENV).ok(),
            allow_prompt,
        }
    }
}

/// One step of the lookup chain.
pub struct CredentialSource<'a> {
    pub kind: SourceKind,
    /// Path or variable name, for logs.
    pub origin: String,
    probe: Box<dyn Fn() -> Option<Credential> + 'a>,
}

impl CredentialSource<'_> {
    /// Run this step.
    #[must_use]
    pub fn probe(&self) -> Option<Credential> {
        (self.probe)()
    }
}

impl std::fmt::Debug for CredentialSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSource")
            .field("kind", &self.kind)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// A key plus where it was found.
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub credential: Credential,
    pub source: SourceKind,
    pub origin: String,
}

// =============================================================================
// Resolver
// =============================================================================

/// Walks the lookup chain and returns the first key found.
#[derive(Debug)]
pub struct CredentialResolver<P = StdinPrompter> {
    context: ResolverContext,
    prompter: P,
}

impl<P: Prompter> CredentialResolver<P> {
    #[must_use]
    pub const fn new(context: ResolverContext, prompter: P) -> Self {
        Self { context, prompter }
    }

    /// The lookup chain in order. Nothing runs until a source is probed.
    #[must_use]
    pub fn sources(&self) -> Vec<CredentialSource<'_>> {
        let mut sources: Vec<CredentialSource<'_>> = self
            .context
            .config_candidates
            .iter()
            .map(|candidate| CredentialSource {
                kind: SourceKind::ConfigFile(candidate.location),
                origin: candidate.path.display().to_string(),
                probe: Box::new(move || probe_config_file(candidate)),
            })
            .collect();

        let env_value = self.context.env_value.as_deref();
        sources.push(CredentialSource {
            kind: SourceKind::Environment,
            origin: API_KEY_ENV.to_string(),
            probe: Box::new(move || probe_env(env_value)),
        });

        if self.context.allow_prompt {
            let prompter = &self.prompter;
            sources.push(CredentialSource {
                kind: SourceKind::Prompt,
                origin: "stdin".to_string(),
                probe: Box::new(move || {
                    prompter
                        .prompt(PROMPT_MESSAGE)
                        .and_then(|line| Credential::new(&line))
                }),
            });
        }

        sources
    }

    /// Find the API key.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::NoCredentialFound`] when every source comes up
    /// empty.
    pub fn resolve(&self) -> Result<ResolvedCredential> {
        let sources = self.sources();
        let mut searched = Vec::with_capacity(sources.len());

        for source in &sources {
            if let Some(credential) = source.probe() {
                tracing::info!(
                    source = source.kind.label(),
                    origin = %source.origin,
                    fingerprint = %credential.fingerprint(),
                    "Resolved API key"
                );
                return Ok(ResolvedCredential {
                    credential,
                    source: source.kind,
                    origin: source.origin.clone(),
                });
            }
            searched.push(format!("{} ({})", source.kind.label(), source.origin));
        }

        Err(UsageError::NoCredentialFound { searched })
    }
}

fn probe_config_file(candidate: &ConfigCandidate) -> Option<Credential> {
    let location = candidate.location.label();
    let file = match ConfigFile::load(&candidate.path) {
        Ok(Some(file)) => file,
        Ok(None) => {
            tracing::debug!(location, path = %candidate.path.display(), "Config file not present");
            return None;
        }
        Err(e) => {
            tracing::debug!(location, error = %e, "Config file skipped");
            return None;
        }
    };

    file.api_key()
        .inspect_err(|e| tracing::debug!(location, error = %e, "No usable key in config file"))
        .ok()
}

fn probe_env(value: Option<&str>) -> Option<Credential> {
    let credential = value.and_then(Credential::new);
    if credential.is_none() && value.is_some() {
        tracing::debug!(
            error = %UsageError::BlankCredential { origin: API_KEY_ENV.to_string() },
            "Ignoring environment value"
        );
    }
    credential
}
