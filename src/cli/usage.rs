//! Usage command implementation.

use crate::cli::args::{Cli, UsageArgs};
use crate::core::credential::{CredentialResolver, ResolverContext, StdinPrompter};
use crate::core::http::AnthropicClient;
use crate::core::pipeline::{UsageReport, collect_usage};
use crate::core::query::UsageQueryEngine;
use crate::core::reset_clock::ResetClock;
use crate::core::timezone::ResolvedTimezone;
use crate::error::Result;
use crate::render;
use crate::storage::config::ResolvedConfig;
use crate::storage::paths::AppPaths;
use crate::storage::report::write_report;

/// Execute the usage command.
///
/// Failed model queries are reported in the output, not as an error.
///
/// # Errors
///
/// Returns an error for invalid settings or when no API key is found.
pub async fn execute(cli: &Cli, args: &UsageArgs) -> Result<()> {
    let paths = AppPaths::capture();
    let config = ResolvedConfig::resolve(cli, args, &paths)?;
    tracing::debug!(
        models = config.models.len(),
        base_url = %config.base_url,
        timeout_secs = config.timeout.as_secs(),
        base_url_source = %config.sources.base_url,
        "Resolved settings"
    );

    let timezone = ResolvedTimezone::resolve(config.timezone.as_deref())?;
    tracing::debug!(timezone = timezone.name(), source = ?timezone.source(), "Resolved timezone");

    let context =
        ResolverContext::capture(&paths, config.explicit_config.clone(), config.allow_prompt);
    let resolved = CredentialResolver::new(context, StdinPrompter).resolve()?;

    let client = AnthropicClient::new(&config.base_url, config.timeout)?;
    let engine = UsageQueryEngine::with_models(client, config.models.clone());
    let clock = ResetClock::start(timezone);
    let report = collect_usage(&engine, &resolved.credential, &clock).await;

    let rich = crate::rich::should_use_rich_output(config.format, config.no_color);
    let output = render::render_usage(&report, config.format, config.pretty, rich)?;
    println!("{output}");

    if let Some(path) = &config.report_path {
        persist_report(path, &report);
    }

    Ok(())
}

/// Write the report file. Failure is a warning, never an error.
fn persist_report(path: &std::path::Path, report: &UsageReport) {
    match write_report(path, report) {
        Ok(()) => tracing::info!(path = %path.display(), "Report saved"),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not write report");
            eprintln!("Warning: could not write report to {}: {e}", path.display());
        }
    }
}
