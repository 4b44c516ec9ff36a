//! Error rendering.
//!
//! Rich panels with fix suggestions on a terminal, one or two plain lines
//! otherwise, and structured JSON for robot formats.

use rich_rust::Segment;
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::{FixSuggestion, UsageError};
use crate::rich::{Panel, Text, ThemeConfig, colored, create_default_theme, segments_to_string};

/// Render an error for stderr.
#[must_use]
pub fn render_error(error: &UsageError, format: OutputFormat, no_color: bool, pretty: bool) -> String {
    match format {
        OutputFormat::Json => return render_error_json(error, pretty),
        OutputFormat::Md => return render_error_json(error, true),
        OutputFormat::Human => {}
    }

    let use_rich = !no_color
        && crate::rich::rich_output_decision(
            format,
            no_color,
            crate::util::env::stderr_is_tty(),
            |key| std::env::var(key).ok(),
        );

    if use_rich {
        render_rich(error)
    } else {
        render_simple(error)
    }
}

/// Structured JSON error.
#[must_use]
pub fn render_error_json(error: &UsageError, pretty: bool) -> String {
    let json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    rendered.unwrap_or_else(|_| render_simple(error))
}

/// Plain text: the error with its code, then the first fix command.
#[must_use]
pub fn render_simple(error: &UsageError) -> String {
    let mut lines = vec![format!("Error [{}]: {}", error.error_code(), error)];

    let first_command = error
        .fix_suggestions()
        .iter()
        .flat_map(|s| s.commands.iter())
        .find(|cmd| !cmd.starts_with('#'))
        .cloned();
    if let Some(cmd) = first_command {
        lines.push(format!("Fix: {cmd}"));
    }

    lines.join("\n")
}

fn render_rich(error: &UsageError) -> String {
    let theme = create_default_theme();
    let suggestions = error.fix_suggestions();

    let mut lines: Vec<Vec<Segment>> = vec![vec![
        Segment::styled(error.to_string(), theme.error.clone()),
        Segment::styled(format!(" [{}]", error.error_code()), theme.muted.clone()),
    ]];

    if !suggestions.is_empty() {
        lines.push(vec![Segment::plain("")]);
        lines.extend(suggestion_lines(&suggestions, &theme));
    }

    if let Some(first) = suggestions.first() {
        if !first.context.is_empty() {
            lines.push(vec![Segment::plain("")]);
            lines.push(vec![Segment::styled("Why this happened:", theme.secondary.clone())]);
            lines.extend(wrap_text(&first.context, 60).into_iter().map(|l| vec![Segment::plain(format!("  {l}"))]));
        }
        if let Some(prevention) = &first.prevention {
            lines.push(vec![Segment::plain("")]);
            lines.push(vec![Segment::styled("Prevention:", theme.success.clone())]);
            lines.extend(wrap_text(prevention, 60).into_iter().map(|l| vec![Segment::plain(format!("  {l}"))]));
        }
    }

    let panel = Panel::new(lines)
        .title(Text::new(error.category().to_string()))
        .border_style(theme.panel_error_border.clone())
        .padding((1, 2));

    segments_to_string(&panel.render(70), false)
}

fn suggestion_lines(suggestions: &[FixSuggestion], theme: &ThemeConfig) -> Vec<Vec<Segment<'static>>> {
    let mut lines = vec![vec![Segment::styled("How to fix:", theme.primary.clone())]];
    for (i, suggestion) in suggestions.iter().enumerate() {
        for (j, cmd) in suggestion.commands.iter().enumerate() {
            let prefix = if j == 0 {
                format!("  {}. ", i + 1)
            } else {
                "     Or: ".to_string()
            };
            lines.push(vec![
                Segment::plain(prefix),
                Segment::styled(cmd.clone(), colored("cyan")),
            ]);
        }
    }
    lines
}

/// Greedy word wrap.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Serialize)]
struct ErrorJson {
    error_code: &'static str,
    category: String,
    message: String,
    exit_code: u8,
    is_retryable: bool,
    suggestions: Vec<SuggestionJson>,
}

#[derive(Serialize)]
struct SuggestionJson {
    commands: Vec<String>,
    context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prevention: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &UsageError) -> Self {
        Self {
            error_code: error.error_code(),
            category: error.category().to_string(),
            message: error.to_string(),
            exit_code: error.exit_code() as u8,
            is_retryable: error.is_retryable(),
            suggestions: error
                .fix_suggestions()
                .into_iter()
                .map(|s| SuggestionJson {
                    commands: s.commands,
                    context: s.context,
                    prevention: s.prevention,
                })
                .collect(),
        }
    }
}
