//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Anthropic Usage - Show token rate limits for Claude models.
#[derive(Parser, Debug)]
#[command(name = "anthropic-usage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Usage flags accepted without a subcommand.
    #[command(flatten)]
    pub usage: UsageArgs,

    // === Global flags ===
    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the effective output format.
    #[must_use]
    pub const fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query rate limits for every model (default command)
    Usage(UsageArgs),

    /// List the models that are queried
    Models,
}

/// Arguments for the `usage` command.
#[derive(Args, Debug, Default, Clone)]
pub struct UsageArgs {
    /// Config file to try before the default locations
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only query this model (repeatable)
    #[arg(long = "model", value_name = "MODEL")]
    pub models: Vec<String>,

    /// IANA timezone for reset times (e.g. Europe/Berlin)
    #[arg(long, value_name = "TZ")]
    pub timezone: Option<String>,

    /// Where to write the report file
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Do not write the report file
    #[arg(long, conflicts_with = "output")]
    pub no_report: bool,

    /// Never prompt for an API key
    #[arg(long)]
    pub no_prompt: bool,

    /// API base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable rich output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Markdown output
    Md,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_to_none() {
        let cli = Cli::parse_from(["anthropic-usage"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.effective_format(), OutputFormat::Human);
    }

    #[test]
    fn json_shorthand() {
        let cli = Cli::parse_from(["anthropic-usage", "--json"]);
        assert_eq!(cli.effective_format(), OutputFormat::Json);
    }

    #[test]
    fn usage_flags_parse() {
        let cli = Cli::parse_from([
            "anthropic-usage",
            "usage",
            "--model",
            "claude-3-opus-20240229",
            "--model",
            "claude-3-haiku-20240307",
            "--timezone",
            "Asia/Tokyo",
            "--no-prompt",
            "--timeout",
            "5",
            "--format",
            "md",
        ]);
        let Some(Commands::Usage(args)) = cli.command else {
            panic!("expected usage command");
        };
        assert_eq!(args.models.len(), 2);
        assert_eq!(args.timezone.as_deref(), Some("Asia/Tokyo"));
        assert!(args.no_prompt);
        assert_eq!(args.timeout, Some(5));
        assert_eq!(cli.format, OutputFormat::Md);
    }

    #[test]
    fn usage_flags_work_without_subcommand() {
        let cli = Cli::parse_from(["anthropic-usage", "--timezone", "UTC", "--no-report"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.usage.timezone.as_deref(), Some("UTC"));
        assert!(cli.usage.no_report);
    }

    #[test]
    fn no_report_conflicts_with_output() {
        let result = Cli::try_parse_from([
            "anthropic-usage",
            "usage",
            "--no-report",
            "--output",
            "x.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn models_subcommand() {
        let cli = Cli::parse_from(["anthropic-usage", "models", "--json"]);
        assert!(matches!(cli.command, Some(Commands::Models)));
        assert!(cli.json);
    }
}
