//! Robot-mode output (JSON and Markdown).
//!
//! Stable, token-efficient output for scripts and agents.

use serde::Serialize;

use crate::core::models::{ModelId, RobotOutput};
use crate::core::pipeline::UsageReport;
use crate::error::Result;
use crate::util::format::{format_count, format_optional_count, format_percent};

/// Render any serializable value as JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json<T: Serialize>(output: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(output)?)
    } else {
        Ok(serde_json::to_string(output)?)
    }
}

/// Envelope for the usage command.
#[must_use]
pub fn usage_output(report: &UsageReport) -> RobotOutput<&UsageReport> {
    let errors = report
        .records
        .iter()
        .filter_map(|r| r.error_detail().map(|d| format!("{}: {d}", r.model)))
        .collect();
    RobotOutput::new("usage", report, report.generated_at).with_errors(errors)
}

/// Render usage as a JSON envelope.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_usage_json(report: &UsageReport, pretty: bool) -> Result<String> {
    render_json(&usage_output(report), pretty)
}

/// Render usage as Markdown.
#[must_use]
pub fn render_usage_md(report: &UsageReport) -> String {
    let mut output = format!("# Anthropic rate limits\n\n- timezone: {}\n\n", report.timezone);

    for record in &report.records {
        output.push_str(&format!("## {}\n", record.model));
        match record.usage() {
            Some(usage) => {
                output.push_str(&format!(
                    "- tokens_left: {} / {} ({})\n",
                    format_count(usage.remaining_tokens),
                    format_count(usage.total_tokens),
                    format_percent(usage.remaining_percent())
                ));
                if usage.requests_limit.is_some() || usage.requests_remaining.is_some() {
                    output.push_str(&format!(
                        "- requests_left: {} / {}\n",
                        format_optional_count(usage.requests_remaining),
                        format_optional_count(usage.requests_limit)
                    ));
                }
                if let Some(reset) = &usage.reset {
                    output.push_str(&format!("- resets_in: {}\n", reset.time_remaining));
                    output.push_str(&format!("- resets_at: {}\n", reset.local_reset_time));
                }
            }
            None => {
                output.push_str("- status: failed\n");
                output.push_str(&format!(
                    "- error: {}\n",
                    record.error_detail().unwrap_or("query failed")
                ));
            }
        }
        output.push('\n');
    }

    output
}

/// Model listing for `models --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    pub id: &'static str,
    pub display_name: &'static str,
}

#[must_use]
pub fn model_entries() -> Vec<ModelEntry> {
    ModelId::ALL
        .iter()
        .map(|m| ModelEntry {
            id: m.api_name(),
            display_name: m.display_name(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{ModelUsage, ResetInfo, SCHEMA_VERSION, UsageRecord};
    use crate::assert_json_valid;
    use chrono::{TimeZone, Utc};

    fn report() -> UsageReport {
        let now = Utc.with_ymd_and_hms(2024, 11, 2, 20, 0, 0).unwrap();
        UsageReport {
            timezone: "Europe/Berlin".to_string(),
            generated_at: now,
            records: vec![
                UsageRecord::success(
                    ModelId::Claude3Haiku,
                    ModelUsage {
                        total_tokens: 50_000,
                        remaining_tokens: 50_000,
                        reset_instant: now,
                        requests_limit: None,
                        requests_remaining: None,
                        reset: Some(ResetInfo {
                            time_remaining_secs: 0,
                            time_remaining: "0 minutes".to_string(),
                            local_reset_time: "2024-11-02 09:00:00 PM CET".to_string(),
                        }),
                    },
                ),
                UsageRecord::failed(ModelId::Claude3Opus, "HTTP 401: invalid x-api-key"),
            ],
        }
    }

    #[test]
    fn json_envelope_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&render_usage_json(&report(), false).unwrap()).unwrap();
        assert_eq!(json["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(json["command"], "usage");
        assert_eq!(json["data"]["timezone"], "Europe/Berlin");
        assert_eq!(json["data"]["records"][0]["status"], "success");
        assert_eq!(json["data"]["records"][0]["remainingTokens"], 50_000);
        assert_eq!(json["data"]["records"][1]["status"], "failed");
        assert_eq!(
            json["errors"][0],
            "claude-3-opus-20240229: HTTP 401: invalid x-api-key"
        );
    }

    #[test]
    fn pretty_json_is_multiline() {
        let out = render_usage_json(&report(), true).unwrap();
        assert_json_valid!(&out);
        assert!(out.contains('\n'));
    }

    #[test]
    fn markdown_sections() {
        let md = render_usage_md(&report());
        assert!(md.contains("## claude-3-haiku-20240307"));
        assert!(md.contains("- tokens_left: 50,000 / 50,000 (100%)"));
        assert!(md.contains("- resets_in: 0 minutes"));
        assert!(!md.contains("requests_left"));
        assert!(md.contains("- error: HTTP 401: invalid x-api-key"));
    }

    #[test]
    fn model_entries_cover_all_models() {
        let entries = model_entries();
        assert_eq!(entries.len(), ModelId::ALL.len());
        assert_eq!(entries[0].id, "claude-3-5-sonnet-20241022");
    }
}
