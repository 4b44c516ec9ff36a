//! Credential lookup chain against real files on disk.

mod common;

use std::path::PathBuf;

use anthropic_usage::UsageError;
use anthropic_usage::core::credential::{
    CredentialResolver, NoPrompt, ResolverContext, SourceKind,
};
use anthropic_usage::storage::paths::{AppPaths, ConfigLocation};
use anthropic_usage::test_utils::{ScriptedPrompter, TestDir, make_test_config_toml};
use common::logger::TestLogger;

struct Layout {
    dir: TestDir,
}

impl Layout {
    fn new() -> Self {
        let dir = TestDir::new();
        for sub in ["cwd", "bin", "home", "src"] {
            dir.create_dir(sub);
        }
        Self { dir }
    }

    fn paths(&self) -> AppPaths {
        AppPaths {
            cwd: Some(self.dir.file_path("cwd")),
            exe_dir: Some(self.dir.file_path("bin")),
            home: Some(self.dir.file_path("home")),
            source_dir: Some(self.dir.file_path("src")),
        }
    }

    fn write(&self, rel: &str, key: &str) -> PathBuf {
        self.dir.create_file(rel, &make_test_config_toml(key))
    }

    fn context(&self, explicit: Option<PathBuf>, env: Option<&str>, allow_prompt: bool) -> ResolverContext {
        ResolverContext {
            config_candidates: self.paths().config_candidates(explicit.as_deref()),
            env_value: env.map(str::to_string),
            allow_prompt,
        }
    }
}

#[test]
fn working_dir_config_beats_every_other_source() {
    let log = TestLogger::new("working_dir_config_beats_every_other_source");
    log.phase("setup");
    let layout = Layout::new();
    layout.write("cwd/config.toml", "sk-cwd");
    layout.write("bin/config.toml", "sk-bin");
    layout.write("home/.anthropic_usage/config.toml", "sk-home");
    layout.write("src/config.toml", "sk-src");
    let prompter = ScriptedPrompter::answering("sk-typed");

    log.phase("execute");
    let resolved = CredentialResolver::new(layout.context(None, Some("sk-env"), true), &prompter)
        .resolve()
        .unwrap();

    log.phase("verify");
    assert_eq!(resolved.credential.expose(), "sk-cwd");
    assert_eq!(resolved.source, SourceKind::ConfigFile(ConfigLocation::WorkingDir));
    assert_eq!(prompter.times_asked(), 0);
    log.finish_ok();
}

#[test]
fn lookup_falls_through_in_order() {
    let layout = Layout::new();
    layout.write("home/.anthropic_usage/config.toml", "sk-home");
    layout.write("src/config.toml", "sk-src");

    let resolved = CredentialResolver::new(layout.context(None, Some("sk-env"), false), NoPrompt)
        .resolve()
        .unwrap();
    assert_eq!(resolved.credential.expose(), "sk-home");
    assert_eq!(resolved.source, SourceKind::ConfigFile(ConfigLocation::HomeDir));
}

#[test]
fn explicit_config_comes_first() {
    let layout = Layout::new();
    layout.write("cwd/config.toml", "sk-cwd");
    let explicit = layout.write("elsewhere/custom.toml", "sk-explicit");

    let resolved =
        CredentialResolver::new(layout.context(Some(explicit), None, false), NoPrompt)
            .resolve()
            .unwrap();
    assert_eq!(resolved.credential.expose(), "sk-explicit");
    assert_eq!(resolved.source, SourceKind::ConfigFile(ConfigLocation::Explicit));
}

#[test]
fn broken_files_are_skipped() {
    let log = TestLogger::new("broken_files_are_skipped");
    let layout = Layout::new();
    // Unparseable TOML.
    layout.dir.create_file("cwd/config.toml", "[anthropic\napi_key = ");
    // A directory where a file is expected cannot be read.
    layout.dir.create_dir("bin/config.toml");
    // Parses, but the key is missing.
    layout.dir.create_file("home/.anthropic_usage/config.toml", "[anthropic]\nother = 1\n");
    // Blank key.
    layout.write("src/config.toml", "   ");

    let resolved = CredentialResolver::new(layout.context(None, Some("sk-env"), false), NoPrompt)
        .resolve()
        .unwrap();
    log.info("Fell through to the environment");
    assert_eq!(resolved.credential.expose(), "sk-env");
    assert_eq!(resolved.source, SourceKind::Environment);
}

#[test]
fn section_and_key_names_ignore_case() {
    let layout = Layout::new();
    layout
        .dir
        .create_file("cwd/config.toml", "[Anthropic]\nAPI_KEY = \"sk-mixed\"\n");

    let resolved = CredentialResolver::new(layout.context(None, None, false), NoPrompt)
        .resolve()
        .unwrap();
    assert_eq!(resolved.credential.expose(), "sk-mixed");
}

#[test]
fn ini_config_in_working_dir_is_used() {
    let log = TestLogger::new("ini_config_in_working_dir_is_used");
    let layout = Layout::new();
    layout
        .dir
        .create_file("cwd/config.ini", "[ANTHROPIC]\nAPI_KEY = sk-from-ini\n");

    let resolved = CredentialResolver::new(layout.context(None, None, false), NoPrompt)
        .resolve()
        .unwrap();
    assert_eq!(resolved.credential.expose(), "sk-from-ini");
    assert_eq!(resolved.source, SourceKind::ConfigFile(ConfigLocation::WorkingDir));
    assert!(resolved.origin.ends_with("config.ini"));
    log.finish_ok();
}

#[test]
fn ini_config_under_home_is_used() {
    let layout = Layout::new();
    layout
        .dir
        .create_file("home/.anthropic_usage/config.ini", "[anthropic]\napi_key = sk-home-ini\n");

    let resolved = CredentialResolver::new(layout.context(None, Some("sk-env"), false), NoPrompt)
        .resolve()
        .unwrap();
    assert_eq!(resolved.credential.expose(), "sk-home-ini");
    assert_eq!(resolved.source, SourceKind::ConfigFile(ConfigLocation::HomeDir));
}

#[test]
fn toml_beats_ini_in_the_same_directory() {
    let layout = Layout::new();
    layout.write("bin/config.toml", "sk-toml");
    layout
        .dir
        .create_file("bin/config.ini", "[ANTHROPIC]\nAPI_KEY = sk-ini\n");

    let resolved = CredentialResolver::new(layout.context(None, None, false), NoPrompt)
        .resolve()
        .unwrap();
    assert_eq!(resolved.credential.expose(), "sk-toml");
}

#[test]
fn prompt_is_last_resort() {
    let layout = Layout::new();
    let prompter = ScriptedPrompter::answering("  sk-typed  ");

    let resolved = CredentialResolver::new(layout.context(None, Some("   "), true), &prompter)
        .resolve()
        .unwrap();
    assert_eq!(resolved.credential.expose(), "sk-typed");
    assert_eq!(resolved.source, SourceKind::Prompt);
    assert_eq!(prompter.times_asked(), 1);
}

#[test]
fn nothing_found_lists_every_source() {
    let layout = Layout::new();
    let prompter = ScriptedPrompter::closed();

    let err = CredentialResolver::new(layout.context(None, None, true), &prompter)
        .resolve()
        .unwrap_err();

    let UsageError::NoCredentialFound { searched } = &err else {
        panic!("unexpected error: {err}");
    };
    // Two file names in four locations, the environment, and the prompt.
    assert_eq!(searched.len(), 10);
    assert!(searched.iter().any(|s| s.contains("config.ini")));
    assert!(searched.iter().any(|s| s.contains("ANTHROPIC_API_KEY")));
    assert_eq!(err.error_code(), "AU-K001");
}

#[test]
fn resolver_never_prints_the_key() {
    let layout = Layout::new();
    layout.write("cwd/config.toml", "sk-ant-very-secret");

    let resolved = CredentialResolver::new(layout.context(None, None, false), NoPrompt)
        .resolve()
        .unwrap();
    let debug = format!("{resolved:?}");
    assert!(!debug.contains("sk-ant-very-secret"));
}
