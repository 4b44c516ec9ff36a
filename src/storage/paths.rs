//! Filesystem locations probed for config files and used for the report.
//!
//! Everything is captured once into [`AppPaths`] so callers and tests work
//! with fixed values instead of re-reading the process environment.

use std::path::{Path, PathBuf};

/// Name of the config file looked up in every candidate directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// INI config file (`[ANTHROPIC]` / `API_KEY = ...`), tried after the TOML one.
pub const INI_CONFIG_FILE_NAME: &str = "config.ini";

/// File names probed per directory, in order.
const CONFIG_FILE_NAMES: [&str; 2] = [CONFIG_FILE_NAME, INI_CONFIG_FILE_NAME];

/// Dedicated directory under the user's home.
pub const HOME_CONFIG_DIR: &str = ".anthropic_usage";

/// Name of the persisted report.
pub const REPORT_FILE_NAME: &str = "anthropic_token_usage.txt";

/// Where a candidate config file lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigLocation {
    /// Path given with `--config`.
    Explicit,
    /// Current working directory.
    WorkingDir,
    /// Directory of the running executable.
    ExecutableDir,
    /// `~/.anthropic_usage/`.
    HomeDir,
    /// Crate source directory recorded at build time.
    SourceDir,
}

impl ConfigLocation {
    /// Short label for logs and error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Explicit => "explicit config",
            Self::WorkingDir => "working-directory config",
            Self::ExecutableDir => "executable-directory config",
            Self::HomeDir => "home config",
            Self::SourceDir => "source-directory config",
        }
    }
}

/// A config file path paired with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCandidate {
    pub location: ConfigLocation,
    pub path: PathBuf,
}

/// Directories relevant to config lookup and report output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppPaths {
    /// Current working directory.
    pub cwd: Option<PathBuf>,
    /// Directory containing the running executable.
    pub exe_dir: Option<PathBuf>,
    /// User home directory.
    pub home: Option<PathBuf>,
    /// Crate source directory.
    pub source_dir: Option<PathBuf>,
}

impl AppPaths {
    /// Capture the directories of the current process.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            cwd: std::env::current_dir().ok(),
            exe_dir: std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf)),
            home: directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()),
            source_dir: option_env!("CARGO_MANIFEST_DIR").map(PathBuf::from),
        }
    }

    /// `~/.anthropic_usage`.
    #[must_use]
    pub fn home_config_dir(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join(HOME_CONFIG_DIR))
    }

    /// Candidate config files in lookup order.
    ///
    /// An explicit path always comes first. Each directory is probed for
    /// `config.toml`, then `config.ini`. Directories that could not be
    /// determined are skipped.
    #[must_use]
    pub fn config_candidates(&self, explicit: Option<&Path>) -> Vec<ConfigCandidate> {
        let explicit = explicit.map(|path| ConfigCandidate {
            location: ConfigLocation::Explicit,
            path: path.to_path_buf(),
        });

        let dirs = [
            (ConfigLocation::WorkingDir, self.cwd.clone()),
            (ConfigLocation::ExecutableDir, self.exe_dir.clone()),
            (ConfigLocation::HomeDir, self.home_config_dir()),
            (ConfigLocation::SourceDir, self.source_dir.clone()),
        ];
        let in_dirs = dirs.into_iter().flat_map(|(location, dir)| {
            dir.into_iter().flat_map(move |dir| {
                CONFIG_FILE_NAMES.map(|name| ConfigCandidate {
                    location,
                    path: dir.join(name),
                })
            })
        });

        explicit.into_iter().chain(in_dirs).collect()
    }

    /// Default report location: beside the executable, else the working
    /// directory.
    #[must_use]
    pub fn default_report_file(&self) -> PathBuf {
        self.exe_dir
            .as_ref()
            .or(self.cwd.as_ref())
            .map_or_else(|| PathBuf::from(REPORT_FILE_NAME), |d| d.join(REPORT_FILE_NAME))
    }
}
