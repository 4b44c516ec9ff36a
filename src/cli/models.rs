//! Models command: list what `usage` queries.

use chrono::Utc;

use crate::cli::args::OutputFormat;
use crate::core::models::{ModelId, RobotOutput};
use crate::error::Result;
use crate::render::robot;

/// Render the model list.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(format: OutputFormat, pretty: bool) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let output = RobotOutput::new("models", robot::model_entries(), Utc::now());
            robot::render_json(&output, pretty)
        }
        OutputFormat::Md => Ok(ModelId::ALL
            .iter()
            .map(|m| format!("- `{}` ({})", m.api_name(), m.display_name()))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Human => Ok(ModelId::ALL
            .iter()
            .map(|m| format!("{:<28} {}", m.api_name(), m.display_name()))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Execute the models command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(format: OutputFormat, pretty: bool) -> Result<()> {
    println!("{}", render(format, pretty)?);
    Ok(())
}
