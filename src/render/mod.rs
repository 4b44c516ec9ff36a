//! Output rendering for human and robot modes.

pub mod error;
pub mod human;
pub mod robot;
pub mod table;

use crate::cli::args::OutputFormat;
use crate::core::pipeline::UsageReport;
use crate::error::Result;

/// Render a usage report for stdout.
///
/// `rich` selects the styled panel for human output; otherwise the plain
/// grid table is used.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_usage(
    report: &UsageReport,
    format: OutputFormat,
    pretty: bool,
    rich: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human if rich => Ok(human::render_usage(report, false)),
        OutputFormat::Human => Ok(human::render_plain(report)),
        OutputFormat::Json => robot::render_usage_json(report, pretty),
        OutputFormat::Md => Ok(robot::render_usage_md(report)),
    }
}
