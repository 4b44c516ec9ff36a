//! Config files, filesystem locations, and the usage report.

pub mod config;
pub mod paths;
pub mod report;

pub use config::{
    ConfigFile, ConfigSource, ConfigSources, FileSettings, ResolvedConfig, ENV_BASE_URL,
    ENV_NO_COLOR_STD, ENV_REPORT, ENV_TIMEOUT, ENV_TIMEZONE,
};
pub use paths::{AppPaths, ConfigCandidate, ConfigLocation};
pub use report::{render_report, write_report};
