//! Human-readable output using rich_rust.
//!
//! One panel per run, one block per model: remaining tokens as a bar, the
//! countdown, and the reset time in the resolved timezone.

use rich_rust::Segment;

use crate::core::models::{ModelUsage, UsageRecord};
use crate::core::pipeline::UsageReport;
use crate::rich::{
    BarStyle, Panel, ProgressBar, Text, ThemeConfig, colored, create_default_theme,
    create_plain_theme, remaining_style, segments_to_string,
};
use crate::render::table::{LIMIT_WINDOW_NOTE, RESTRICTIVE_NOTE, render_table};
use crate::util::format::{format_count, format_percent};

const PANEL_WIDTH: usize = 72;
const BAR_WIDTH: usize = 16;

/// Render a report as a styled panel.
#[must_use]
pub fn render_usage(report: &UsageReport, no_color: bool) -> String {
    let theme = if no_color {
        create_plain_theme()
    } else {
        create_default_theme()
    };

    let mut lines: Vec<Vec<Segment>> = Vec::new();
    for (i, record) in report.records.iter().enumerate() {
        if i > 0 {
            lines.push(vec![Segment::plain("")]);
        }
        lines.extend(record_lines(record, &theme, no_color));
    }
    if lines.is_empty() {
        lines.push(vec![Segment::styled("No models queried", theme.muted.clone())]);
    }

    lines.push(vec![Segment::plain("")]);
    lines.push(vec![Segment::styled(RESTRICTIVE_NOTE, theme.muted.clone())]);

    let title_text = format!("Anthropic Rate Limits ({})", report.timezone);
    let title = if no_color {
        Text::new(&title_text)
    } else {
        Text::styled(&title_text, theme.primary.clone())
    };

    let mut panel = Panel::new(lines).title(title).padding((0, 1));
    if !no_color {
        panel = panel.border_style(theme.panel_border.clone());
    }

    let segments = panel.render(PANEL_WIDTH);
    segments_to_string(&segments, no_color)
}

/// Plain rendering for pipes and CI: header, grid table, notes.
#[must_use]
pub fn render_plain(report: &UsageReport) -> String {
    format!(
        "Anthropic rate limits (timezone: {})\n{}{RESTRICTIVE_NOTE}\n{LIMIT_WINDOW_NOTE}\n",
        report.timezone,
        render_table(&report.records),
    )
}

fn record_lines<'a>(
    record: &'a UsageRecord,
    theme: &ThemeConfig,
    no_color: bool,
) -> Vec<Vec<Segment<'a>>> {
    let name = format!("{} ({})", record.model.display_name(), record.model.api_name());
    let header = vec![Segment::styled(name, theme.label.clone())];

    match record.usage() {
        Some(usage) => {
            let mut lines = vec![header, usage_bar(usage, theme, no_color)];
            if let Some(reset) = &usage.reset {
                lines.push(vec![
                    Segment::styled("  Resets in ", theme.muted.clone()),
                    Segment::plain(reset.time_remaining.clone()),
                    Segment::styled(" at ", theme.muted.clone()),
                    Segment::plain(reset.local_reset_time.clone()),
                ]);
            }
            if let (Some(limit), Some(remaining)) = (usage.requests_limit, usage.requests_remaining)
            {
                lines.push(vec![Segment::styled(
                    format!(
                        "  Requests: {} / {}",
                        format_count(remaining),
                        format_count(limit)
                    ),
                    theme.muted.clone(),
                )]);
            }
            lines
        }
        None => vec![
            header,
            vec![
                Segment::plain("  "),
                Segment::styled("Failed: ", theme.error.clone()),
                Segment::plain(record.error_detail().unwrap_or("query failed").to_string()),
            ],
        ],
    }
}

fn usage_bar<'a>(usage: &ModelUsage, theme: &ThemeConfig, no_color: bool) -> Vec<Segment<'a>> {
    let percent = usage.remaining_percent();
    let pct_style = remaining_style(percent, theme);

    let mut segments = vec![
        Segment::plain("  "),
        Segment::styled(format!("{:>4} ", format_percent(percent)), pct_style.clone()),
    ];

    let (done, rest) = if no_color {
        (theme.label.clone(), theme.muted.clone())
    } else {
        (pct_style, colored("bright_black"))
    };
    let mut bar = ProgressBar::with_total(100)
        .width(BAR_WIDTH)
        .bar_style(BarStyle::Block)
        .completed_style(done)
        .remaining_style(rest)
        .show_percentage(false);
    bar.set_progress(percent / 100.0);
    segments.extend(bar.render(BAR_WIDTH));

    segments.push(Segment::plain(format!(
        " {} / {} tokens left",
        format_count(usage.remaining_tokens),
        format_count(usage.total_tokens)
    )));
    segments
}
