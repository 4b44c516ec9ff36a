//! Rich terminal output on top of `rich_rust`.
//!
//! The gate in [`should_use_rich_output`] decides whether styled panels are
//! emitted at all. Anything piped, scripted, or in CI gets plain text.

use crate::cli::args::OutputFormat;
use crate::util::env as env_util;

pub use rich_rust::prelude::*;

/// Plain-output override specific to this tool.
pub const PLAIN_ENV: &str = "ANTHROPIC_USAGE_PLAIN";

/// Styles shared by the usage panel and error panels.
#[derive(Debug, Clone)]
pub struct ThemeConfig {
    pub primary: Style,
    pub secondary: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub muted: Style,
    pub label: Style,
    pub panel_border: Style,
    pub panel_error_border: Style,
}

/// Style with a named foreground color, or unstyled if the name is unknown.
#[must_use]
pub fn colored(name: &str) -> Style {
    Color::parse(name).map_or_else(|_| Style::new(), |color| Style::new().color(color))
}

#[must_use]
pub fn create_default_theme() -> ThemeConfig {
    ThemeConfig {
        primary: colored("cyan").bold(),
        secondary: colored("blue"),
        success: colored("green").bold(),
        warning: colored("yellow").bold(),
        error: colored("red").bold(),
        muted: Style::new().dim(),
        label: Style::new().bold(),
        panel_border: colored("blue"),
        panel_error_border: colored("red"),
    }
}

/// Theme with every style cleared, for `--no-color`.
#[must_use]
pub fn create_plain_theme() -> ThemeConfig {
    ThemeConfig {
        primary: Style::new(),
        secondary: Style::new(),
        success: Style::new(),
        warning: Style::new(),
        error: Style::new(),
        muted: Style::new(),
        label: Style::new(),
        panel_border: Style::new(),
        panel_error_border: Style::new(),
    }
}

/// Style for a remaining-percentage figure.
#[must_use]
pub fn remaining_style(percent: f64, theme: &ThemeConfig) -> Style {
    if percent >= 25.0 {
        theme.success.clone()
    } else if percent >= 10.0 {
        theme.warning.clone()
    } else {
        theme.error.clone()
    }
}

/// Whether styled output should be produced for stdout.
#[must_use]
pub fn should_use_rich_output(format: OutputFormat, no_color_flag: bool) -> bool {
    rich_output_decision(
        format,
        no_color_flag,
        env_util::stdout_is_tty(),
        |key| std::env::var(key).ok(),
    )
}

/// Gate logic with the TTY check and env lookup injected.
///
/// Disabled for robot formats, `--no-color`, `NO_COLOR` (any value),
/// `ANTHROPIC_USAGE_PLAIN`, non-TTY output, `TERM=dumb`, and CI.
#[must_use]
pub fn rich_output_decision(
    format: OutputFormat,
    no_color_flag: bool,
    is_tty: bool,
    env: impl Fn(&str) -> Option<String>,
) -> bool {
    let reason = if format != OutputFormat::Human {
        Some("robot_mode")
    } else if no_color_flag {
        Some("no_color_flag")
    } else if env("NO_COLOR").is_some() {
        Some("no_color_env")
    } else if env(PLAIN_ENV).is_some() {
        Some("plain_env")
    } else if !is_tty {
        Some("not_tty")
    } else if env("TERM").is_some_and(|t| t == "dumb") {
        Some("term_dumb")
    } else if env("CI").is_some() || env("GITHUB_ACTIONS").is_some() {
        Some("ci_environment")
    } else {
        None
    };

    match reason {
        Some(reason) => {
            tracing::debug!(reason, decision = "disabled", "Rich output DISABLED");
            false
        }
        None => {
            tracing::debug!(decision = "enabled", "Rich output ENABLED");
            true
        }
    }
}

/// Convert segments to a string, with ANSI codes unless `no_color`.
#[must_use]
pub fn segments_to_string(segments: &[Segment], no_color: bool) -> String {
    segments
        .iter()
        .map(|seg| match &seg.style {
            Some(style) if !no_color => style.render(&seg.text, ColorSystem::TrueColor),
            _ => seg.text.to_string(),
        })
        .collect()
}
