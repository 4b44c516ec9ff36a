//! anthropic-usage - Anthropic API rate limit reporter
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use anthropic_usage::cli::{Cli, Commands};
use anthropic_usage::core::logging::{self, LogSettings};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = LogSettings::resolve(cli.log_level.as_deref(), cli.verbose, cli.json_output);
    logging::init(&settings);

    let format = cli.effective_format();
    let no_color = cli.no_color || std::env::var_os("NO_COLOR").is_some();
    let pretty = cli.pretty;

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{}", e);
            let rendered =
                anthropic_usage::render::error::render_error(&e, format, no_color, pretty);
            eprintln!("{rendered}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: &Cli) -> anthropic_usage::Result<()> {
    match &cli.command {
        // Default to usage command
        None => anthropic_usage::cli::usage::execute(cli, &cli.usage).await,
        Some(Commands::Usage(args)) => anthropic_usage::cli::usage::execute(cli, args).await,
        Some(Commands::Models) => {
            anthropic_usage::cli::models::execute(cli.effective_format(), cli.pretty)
        }
    }
}
