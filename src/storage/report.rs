//! Plain-text usage report written after every run.
//!
//! The file is replaced atomically (temp file + rename) so a reader never
//! sees a half-written report.

use std::io::Write;
use std::path::Path;

use crate::core::pipeline::UsageReport;
use crate::error::Result;
use crate::render::table::{LIMIT_WINDOW_NOTE, RESTRICTIVE_NOTE, render_table};
use crate::util::time::LOCAL_TIME_FORMAT;

/// Report text: header, timezone line, note, and the grid table.
#[must_use]
pub fn render_report(report: &UsageReport) -> String {
    let generated = report
        .timezone
        .parse::<chrono_tz::Tz>()
        .map_or_else(
            |_| report.generated_at.to_rfc3339(),
            |tz| {
                report
                    .generated_at
                    .with_timezone(&tz)
                    .format(LOCAL_TIME_FORMAT)
                    .to_string()
            },
        );

    format!(
        "Anthropic API Token Usage Report\n\
         Generated: {generated}\n\
         System Timezone: {}\n\
         \n\
         {RESTRICTIVE_NOTE}\n\
         {LIMIT_WINDOW_NOTE}\n\
         \n\
         {}",
        report.timezone,
        render_table(&report.records)
    )
}

/// Write the report to `path`, replacing any previous report.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_report(path: &Path, report: &UsageReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_atomic(path, render_report(report).as_bytes())?;
    tracing::debug!(path = %path.display(), "Wrote usage report");
    Ok(())
}

fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let temp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("report"),
        std::process::id()
    ));

    let result = write_and_rename(&temp_path, path, content);
    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    {
        let mut file = std::fs::File::create(temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }
    std::fs::rename(temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ModelId;
    use crate::test_utils::{TestDir, make_test_failed_record, make_test_success_record, test_now};

    fn report() -> UsageReport {
        UsageReport {
            timezone: "America/New_York".to_string(),
            generated_at: test_now(),
            records: vec![
                make_test_success_record(ModelId::Claude35Sonnet),
                make_test_failed_record(ModelId::Claude3Sonnet, "HTTP 404"),
            ],
        }
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .is_ok_and(|e| e.file_name().to_string_lossy().contains(".tmp."))
            })
            .count()
    }

    #[test]
    fn report_has_timezone_and_notes() {
        let text = render_report(&report());
        assert!(text.contains("System Timezone: America/New_York"));
        assert!(text.contains("Generated: 2024-11-02 04:00:00 PM EDT"));
        assert!(text.contains(RESTRICTIVE_NOTE));
        assert!(text.contains(
            "These are typically per-minute limits unless a more restrictive limit (like daily) has been reached."
        ));
        assert!(text.contains("claude-3-5-sonnet-20241022"));
        assert!(text.contains("25,000"));
        assert!(text.contains("claude-3-sonnet-20240229"));
    }

    #[test]
    fn write_creates_and_replaces() {
        let dir = TestDir::new();
        let path = dir.file_path("nested/anthropic_token_usage.txt");

        write_report(&path, &report()).unwrap();
        assert!(dir.file_exists("nested/anthropic_token_usage.txt"));
        let first = dir.read_file("nested/anthropic_token_usage.txt").unwrap();
        assert!(first.contains("HTTP 404"));

        let mut second = report();
        second.records = vec![make_test_failed_record(ModelId::Claude3Sonnet, "HTTP 500")];
        write_report(&path, &second).unwrap();
        let replaced = dir.read_file("nested/anthropic_token_usage.txt").unwrap();
        assert!(replaced.contains("HTTP 500"));
        assert!(!replaced.contains("HTTP 404"));

        assert_eq!(leftover_temp_files(&dir.file_path("nested")), 0);
    }

    #[test]
    fn failed_write_removes_temp_file() {
        let dir = TestDir::new();
        // A directory where the report should go makes the rename fail.
        let path = dir.create_dir("anthropic_token_usage.txt");

        assert!(write_report(&path, &report()).is_err());
        assert_eq!(leftover_temp_files(dir.path()), 0);
        assert!(dir.file_exists("anthropic_token_usage.txt"));
    }
}
