//! Configuration file loading and settings resolution.
//!
//! The config file is TOML:
//!
//! ```toml
//! [anthropic]
//! api_key = "sk-ant-..."
//!
//! [settings]
//! base_url = "https://api.anthropic.com"
//! timeout_seconds = 30
//! timezone = "Europe/Berlin"
//! report_path = "/tmp/anthropic_token_usage.txt"
//! ```
//!
//! Section and key names of the credential entry are matched
//! case-insensitively, so `[ANTHROPIC]` / `API_KEY` work as well.
//!
//! A `config.ini` in the same directory is read when no `config.toml` is
//! there. Values may be unquoted and keys are case-insensitive:
//!
//! ```ini
//! [ANTHROPIC]
//! API_KEY = sk-ant-...
//! ```
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file `[settings]`
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `ANTHROPIC_BASE_URL`: API base URL
//! - `ANTHROPIC_USAGE_TIMEOUT`: request timeout in seconds
//! - `ANTHROPIC_USAGE_TZ`: IANA timezone used for reset times
//! - `ANTHROPIC_USAGE_REPORT`: report file path
//! - `NO_COLOR`: disable colors

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::{Ini, ParseOption};
use serde::Deserialize;

use super::paths::{AppPaths, ConfigCandidate};
use crate::cli::args::{Cli, OutputFormat, UsageArgs};
use crate::core::credential::Credential;
use crate::core::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::core::models::ModelId;
use crate::error::{Result, UsageError};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "ANTHROPIC_BASE_URL";
/// Environment variable for the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "ANTHROPIC_USAGE_TIMEOUT";
/// Environment variable for the timezone override.
pub const ENV_TIMEZONE: &str = "ANTHROPIC_USAGE_TZ";
/// Environment variable for the report path.
pub const ENV_REPORT: &str = "ANTHROPIC_USAGE_REPORT";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";

const CREDENTIAL_SECTION: &str = "anthropic";
const CREDENTIAL_KEY: &str = "api_key";

// =============================================================================
// Config File
// =============================================================================

/// `[settings]` table of a config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileSettings {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub timezone: Option<String>,
    pub report_path: Option<PathBuf>,
}

/// A parsed config file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    table: toml::Table,
}

impl ConfigFile {
    /// Load and parse a config file.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::ConfigFileUnreadable`] when the file exists but
    /// cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(UsageError::ConfigFileUnreadable {
                    path: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        };

        Self::parse(path, &content).map(Some)
    }

    /// Parse config content read from `path`. Files ending in `.ini` are
    /// read as INI, everything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::ConfigFileUnreadable`] on invalid content.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let parsed = if is_ini(path) {
            parse_ini(content)
        } else {
            content
                .parse::<toml::Table>()
                .map_err(|e| e.message().to_string())
        };
        let table = parsed.map_err(|message| UsageError::ConfigFileUnreadable {
            path: path.display().to_string(),
            message,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            table,
        })
    }

    /// First candidate that exists and parses. Unreadable files are skipped.
    #[must_use]
    pub fn discover(candidates: &[ConfigCandidate]) -> Option<(ConfigCandidate, Self)> {
        candidates.iter().find_map(|candidate| match Self::load(&candidate.path) {
            Ok(Some(file)) => Some((candidate.clone(), file)),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(location = candidate.location.label(), error = %e, "Skipping config file");
                None
            }
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The credential stored under `[anthropic] api_key`.
    ///
    /// # Errors
    ///
    /// - [`UsageError::ConfigKeyMissing`] when the section or key is absent
    ///   or the value is not a string
    /// - [`UsageError::BlankCredential`] when the value is empty or whitespace
    pub fn api_key(&self) -> Result<Credential> {
        let path = self.path.display().to_string();

        let value = lookup_ignore_case(&self.table, CREDENTIAL_SECTION)
            .and_then(toml::Value::as_table)
            .and_then(|section| lookup_ignore_case(section, CREDENTIAL_KEY))
            .and_then(toml::Value::as_str)
            .ok_or_else(|| UsageError::ConfigKeyMissing { path: path.clone() })?;

        Credential::new(value).ok_or(UsageError::BlankCredential { origin: path })
    }

    /// The `[settings]` table. A malformed table is ignored.
    #[must_use]
    pub fn settings(&self) -> FileSettings {
        let Some(raw) = self.table.get("settings") else {
            return FileSettings::default();
        };

        raw.clone().try_into().unwrap_or_else(|e: toml::de::Error| {
            tracing::debug!(path = %self.path.display(), error = %e.message(), "Ignoring malformed [settings]");
            FileSettings::default()
        })
    }
}

fn is_ini(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ini"))
}

/// INI content as a TOML table: lowercased section and key names, integer
/// looking values as integers, everything else as strings.
fn parse_ini(content: &str) -> std::result::Result<toml::Table, String> {
    let options = ParseOption {
        enabled_quote: true,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(content, options).map_err(|e| e.to_string())?;

    let mut table = toml::Table::new();
    for (section, properties) in ini.iter() {
        let entries: toml::Table = properties
            .iter()
            .map(|(key, value)| (key.to_lowercase(), ini_value(value)))
            .collect();
        match section {
            Some(name) => {
                table.insert(name.to_lowercase(), toml::Value::Table(entries));
            }
            None => table.extend(entries),
        }
    }
    Ok(table)
}

fn ini_value(raw: &str) -> toml::Value {
    let raw = raw.trim();
    raw.parse::<i64>()
        .map_or_else(|_| toml::Value::String(raw.to_string()), toml::Value::Integer)
}

fn lookup_ignore_case<'a>(table: &'a toml::Table, key: &str) -> Option<&'a toml::Value> {
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Tracks the source of each layered setting.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub base_url: ConfigSource,
    pub timeout: ConfigSource,
    pub timezone: ConfigSource,
    pub report_path: ConfigSource,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Models to query, in declared order.
    pub models: Vec<ModelId>,
    /// API base URL without trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Timezone override; `None` means detect.
    pub timezone: Option<String>,
    /// Report destination; `None` when reporting is disabled.
    pub report_path: Option<PathBuf>,
    /// Explicit config file from `--config`.
    pub explicit_config: Option<PathBuf>,
    /// Whether the interactive key prompt may run.
    pub allow_prompt: bool,
    /// Output format.
    pub format: OutputFormat,
    /// Pretty-print JSON output.
    pub pretty: bool,
    /// Disable colored output.
    pub no_color: bool,
    /// Source of each layered setting.
    pub sources: ConfigSources,
}

impl ResolvedConfig {
    /// Resolve settings from CLI args, the process environment and the first
    /// config file found.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown models or invalid timeout values.
    pub fn resolve(cli: &Cli, args: &UsageArgs, paths: &AppPaths) -> Result<Self> {
        let candidates = paths.config_candidates(args.config.as_deref());
        let settings = ConfigFile::discover(&candidates)
            .map(|(candidate, file)| {
                tracing::debug!(
                    location = candidate.location.label(),
                    path = %file.path().display(),
                    "Loaded settings"
                );
                file.settings()
            })
            .unwrap_or_default();

        Self::resolve_with(cli, args, paths, &settings, |key| std::env::var(key).ok())
    }

    /// Resolve with injected file settings and environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown models or invalid timeout values.
    pub fn resolve_with(
        cli: &Cli,
        args: &UsageArgs,
        paths: &AppPaths,
        settings: &FileSettings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut sources = ConfigSources::default();

        let models = ModelId::select(&args.models)?;

        let base_url = Self::layer(
            args.base_url.clone(),
            env(ENV_BASE_URL),
            settings.base_url.clone(),
            &mut sources.base_url,
        )
        .map_or_else(|| DEFAULT_BASE_URL.to_string(), |url| url.trim_end_matches('/').to_string());

        let timeout = Self::resolve_timeout(args, settings, &env, &mut sources.timeout)?;

        let timezone = Self::layer(
            args.timezone.clone(),
            env(ENV_TIMEZONE),
            settings.timezone.clone(),
            &mut sources.timezone,
        );

        let report_path = if args.no_report {
            sources.report_path = ConfigSource::Cli;
            None
        } else {
            Some(
                Self::layer(
                    args.output.clone(),
                    env(ENV_REPORT).map(PathBuf::from),
                    settings.report_path.clone(),
                    &mut sources.report_path,
                )
                .unwrap_or_else(|| paths.default_report_file()),
            )
        };

        Ok(Self {
            models,
            base_url,
            timeout,
            timezone,
            report_path,
            explicit_config: args.config.clone(),
            allow_prompt: !args.no_prompt,
            format: cli.effective_format(),
            pretty: cli.pretty,
            no_color: cli.no_color || env(ENV_NO_COLOR_STD).is_some(),
            sources,
        })
    }

    /// Pick the highest-precedence value and record where it came from.
    fn layer<T>(
        cli: Option<T>,
        env: Option<T>,
        file: Option<T>,
        source: &mut ConfigSource,
    ) -> Option<T> {
        let (value, from) = if cli.is_some() {
            (cli, ConfigSource::Cli)
        } else if env.is_some() {
            (env, ConfigSource::Env)
        } else if file.is_some() {
            (file, ConfigSource::ConfigFile)
        } else {
            (None, ConfigSource::Default)
        };
        *source = from;
        value
    }

    fn resolve_timeout(
        args: &UsageArgs,
        settings: &FileSettings,
        env: &impl Fn(&str) -> Option<String>,
        source: &mut ConfigSource,
    ) -> Result<Duration> {
        let env_secs = env(ENV_TIMEOUT)
            .map(|raw| {
                raw.parse::<u64>().map_err(|_| {
                    UsageError::Config(format!("{ENV_TIMEOUT} must be a whole number of seconds, got '{raw}'"))
                })
            })
            .transpose()?;

        let secs = Self::layer(args.timeout, env_secs, settings.timeout_seconds, source);

        match secs {
            Some(0) => Err(UsageError::Config(
                "timeout must be greater than 0 seconds".to_string(),
            )),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }
}
