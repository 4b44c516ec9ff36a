//! Plain-text grid table of usage records.
//!
//! Used for the report file and for human output when rich rendering is
//! disabled. Contains no ANSI codes.

use crate::core::models::UsageRecord;
use crate::util::format::{format_count, format_optional_count};

const HEADERS: [&str; 7] = [
    "Model",
    "Req Limit",
    "Req Remaining",
    "Token Limit",
    "Tokens Remaining",
    "Resets In",
    "Reset Time",
];

/// Columns right-aligned as numbers.
const NUMERIC: [bool; 7] = [false, true, true, true, true, false, false];

/// Note printed under every table.
pub const RESTRICTIVE_NOTE: &str =
    "Note: Reported limits are the most restrictive currently in effect for each model.";

/// Second line of the note: which window the limits usually describe.
pub const LIMIT_WINDOW_NOTE: &str = "These are typically per-minute limits unless a more restrictive limit (like daily) has been reached.";

/// Cell values for one record.
#[must_use]
pub fn row_cells(record: &UsageRecord) -> [String; 7] {
    let model = record.model.api_name().to_string();
    match record.usage() {
        Some(usage) => {
            let (resets_in, reset_time) = usage.reset.as_ref().map_or_else(
                || ("-".to_string(), usage.reset_instant.to_rfc3339()),
                |r| (r.time_remaining.clone(), r.local_reset_time.clone()),
            );
            [
                model,
                format_optional_count(usage.requests_limit),
                format_optional_count(usage.requests_remaining),
                format_count(usage.total_tokens),
                format_count(usage.remaining_tokens),
                resets_in,
                reset_time,
            ]
        }
        None => {
            let detail = record.error_detail().unwrap_or("query failed");
            [
                model,
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                "FAILED".to_string(),
                detail.to_string(),
            ]
        }
    }
}

/// Render records as a grid table.
#[must_use]
pub fn render_table(records: &[UsageRecord]) -> String {
    let rows: Vec<[String; 7]> = records.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&rule(&widths, '-'));
    out.push_str(&line(&HEADERS.map(str::to_string), &widths, false));
    out.push_str(&rule(&widths, '='));
    for row in &rows {
        out.push_str(&line(row, &widths, true));
        out.push_str(&rule(&widths, '-'));
    }
    if rows.is_empty() {
        out.push_str(&rule(&widths, '-'));
    }
    out
}

fn rule(widths: &[usize; 7], fill: char) -> String {
    let mut s = String::from("+");
    for &w in widths {
        s.extend(std::iter::repeat_n(fill, w + 2));
        s.push('+');
    }
    s.push('\n');
    s
}

fn line(cells: &[String; 7], widths: &[usize; 7], align_numbers: bool) -> String {
    let mut s = String::from("|");
    for ((cell, &w), &numeric) in cells.iter().zip(widths).zip(&NUMERIC) {
        if align_numbers && numeric {
            s.push_str(&format!(" {cell:>w$} |"));
        } else {
            s.push_str(&format!(" {cell:<w$} |"));
        }
    }
    s.push('\n');
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{ModelId, ModelUsage, ResetInfo};
    use chrono::{TimeZone, Utc};

    fn success() -> UsageRecord {
        UsageRecord::success(
            ModelId::Claude35Sonnet,
            ModelUsage {
                total_tokens: 100_000,
                remaining_tokens: 25_000,
                reset_instant: Utc.with_ymd_and_hms(2024, 11, 2, 22, 0, 0).unwrap(),
                requests_limit: Some(4_000),
                requests_remaining: None,
                reset: Some(ResetInfo {
                    time_remaining_secs: 7200,
                    time_remaining: "2 hours 0 minutes".to_string(),
                    local_reset_time: "2024-11-02 10:00:00 PM UTC".to_string(),
                }),
            },
        )
    }

    #[test]
    fn table_has_headers_and_values() {
        let table = render_table(&[success()]);
        assert!(table.contains("Tokens Remaining"));
        assert!(table.contains("claude-3-5-sonnet-20241022"));
        assert!(table.contains("100,000"));
        assert!(table.contains("25,000"));
        assert!(table.contains("4,000"));
        assert!(table.contains("2 hours 0 minutes"));
        assert!(table.contains("2024-11-02 10:00:00 PM UTC"));
        assert!(!table.contains('\x1b'));
    }

    #[test]
    fn failed_rows_show_dashes_and_detail() {
        let failed = UsageRecord::failed(ModelId::Claude3Opus, "HTTP 529: Overloaded");
        let cells = row_cells(&failed);
        assert_eq!(cells[0], "claude-3-opus-20240229");
        assert_eq!(cells[3], "-");
        assert_eq!(cells[5], "FAILED");
        assert_eq!(cells[6], "HTTP 529: Overloaded");
    }

    #[test]
    fn all_lines_have_equal_width() {
        let table = render_table(&[
            success(),
            UsageRecord::failed(ModelId::Claude3Opus, "timed out after 30s"),
        ]);
        let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
        // header rule, header, separator, two rows each followed by a rule
        assert_eq!(table.lines().count(), 7);
    }
}
